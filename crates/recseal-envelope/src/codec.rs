use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::error::{EnvelopeError, Result};
use crate::key_ref::KeyRef;

/// Magic marker at offset 0 of every framed payload.
pub const MAGIC: [u8; 6] = [0x2B, 0x45, 0x2B, 0x1B, 0x2B, 0x46];

/// Envelope header: magic (6) + key reference length (4) = 10 bytes.
pub const HEADER_SIZE: usize = MAGIC.len() + 4;

const MAX_KEY_REF: usize = u32::MAX as usize;

/// A parsed inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// No magic marker: the whole input is unframed plaintext.
    Raw(Bytes),
    /// Framed with a zero-length key reference: the body is plaintext.
    Plain(Bytes),
    /// Framed with a key reference: the body is ciphertext.
    Sealed { key_ref: KeyRef, ciphertext: Bytes },
}

impl Envelope {
    /// The key reference carried by the frame, if any.
    pub fn key_ref(&self) -> Option<&KeyRef> {
        match self {
            Envelope::Sealed { key_ref, .. } => Some(key_ref),
            Envelope::Raw(_) | Envelope::Plain(_) => None,
        }
    }

    /// The bytes following the header (the whole input for raw payloads).
    pub fn body(&self) -> &Bytes {
        match self {
            Envelope::Raw(body) | Envelope::Plain(body) => body,
            Envelope::Sealed { ciphertext, .. } => ciphertext,
        }
    }

    /// Whether the input carried the magic marker.
    pub fn is_framed(&self) -> bool {
        !matches!(self, Envelope::Raw(_))
    }

    /// Total wire size of this envelope.
    pub fn wire_size(&self) -> usize {
        match self {
            Envelope::Raw(body) => body.len(),
            Envelope::Plain(body) => HEADER_SIZE + body.len(),
            Envelope::Sealed {
                key_ref,
                ciphertext,
            } => HEADER_SIZE + key_ref.len() + ciphertext.len(),
        }
    }
}

/// Returns true if `data` starts with the envelope magic marker.
pub fn has_magic(data: &[u8]) -> bool {
    data.starts_with(&MAGIC)
}

/// Encode an encrypted payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────────────┬──────────────┬──────────────┬──────────────┐
/// │ Magic (6B)         │ KeyRef len   │ KeyRef       │ Ciphertext   │
/// │ 2B 45 2B 1B 2B 46  │ (4B BE)      │ (len bytes)  │ (remainder)  │
/// └────────────────────┴──────────────┴──────────────┴──────────────┘
/// ```
pub fn encode_sealed(key_ref: &KeyRef, ciphertext: &[u8], dst: &mut BytesMut) -> Result<()> {
    if key_ref.is_empty() {
        return Err(EnvelopeError::EmptyKeyRef);
    }
    if key_ref.len() > MAX_KEY_REF {
        return Err(EnvelopeError::KeyRefTooLarge {
            size: key_ref.len(),
            max: MAX_KEY_REF,
        });
    }
    dst.reserve(HEADER_SIZE + key_ref.len() + ciphertext.len());
    dst.put_slice(&MAGIC);
    dst.put_u32(key_ref.len() as u32);
    dst.put_slice(key_ref.as_bytes());
    dst.put_slice(ciphertext);
    Ok(())
}

/// Encode a payload as a framed but unencrypted envelope (zero-length key reference).
pub fn encode_plain(payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&MAGIC);
    dst.put_u32(0);
    dst.put_slice(payload);
}

/// Decode an inbound payload.
///
/// Input without the magic marker is returned as [`Envelope::Raw`]. Input with
/// the marker whose header or key reference is truncated yields
/// [`EnvelopeError::Malformed`]. No cipher is involved at this level.
pub fn decode_envelope(src: Bytes) -> Result<Envelope> {
    if !has_magic(&src) {
        trace!(len = src.len(), "no envelope magic, passing through raw payload");
        return Ok(Envelope::Raw(src));
    }

    if src.len() < HEADER_SIZE {
        return Err(EnvelopeError::Malformed {
            needed: HEADER_SIZE,
            available: src.len(),
        });
    }

    let mut body = src.slice(MAGIC.len()..);
    let key_ref_len = body.get_u32() as usize;

    if key_ref_len == 0 {
        trace!(len = body.len(), "envelope without key reference, payload is not encrypted");
        return Ok(Envelope::Plain(body));
    }

    if body.len() < key_ref_len {
        return Err(EnvelopeError::Malformed {
            needed: HEADER_SIZE.saturating_add(key_ref_len),
            available: src.len(),
        });
    }

    let key_ref = KeyRef::from(body.split_to(key_ref_len));
    Ok(Envelope::Sealed {
        key_ref,
        ciphertext: body,
    })
}
