use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use recseal_crypto::{DefaultEncryptor, EnvelopeEncoder};
use recseal_envelope::{encode_plain, KeyRef, HEADER_SIZE};
use recseal_keys::{KeyNameObfuscator, PlainKeyNames};
use tracing::debug;

use crate::cmd::{read_file_or_stdin, CryptoOptions, SealArgs};
use crate::exit::{codec_error, CliResult, SUCCESS};
use crate::output::{print_sealed, OutputFormat};

pub fn run(args: SealArgs, options: &CryptoOptions, format: OutputFormat) -> CliResult<i32> {
    let payload = match &args.data {
        Some(data) => data.as_bytes().to_vec(),
        None => read_file_or_stdin(args.file.as_ref())?,
    };
    let payload_size = payload.len();

    let Some(key_name) = &args.key_ref else {
        debug!(payload_size, "framing payload without encryption");
        let mut dst = BytesMut::with_capacity(HEADER_SIZE + payload_size);
        encode_plain(&payload, &mut dst);
        print_sealed(None, &dst, payload_size, format);
        return Ok(SUCCESS);
    };

    let key_ref: KeyRef = PlainKeyNames.obfuscate(key_name);
    let encoder = EnvelopeEncoder::new(Arc::new(DefaultEncryptor::new(
        options.key_provider()?,
        options.algorithm(),
    )));
    let envelope = encoder
        .encode(Bytes::from(payload), Some(&key_ref))
        .map_err(|err| codec_error("seal failed", err))?;

    debug!(%key_ref, payload_size, envelope_size = envelope.len(), "sealed payload");
    print_sealed(Some(&key_ref), &envelope, payload_size, format);
    Ok(SUCCESS)
}
