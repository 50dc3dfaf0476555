use std::io::{IsTerminal, Write};
use std::path::Path;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use recseal_envelope::{Envelope, KeyRef};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Raw
        }
    }
}

#[derive(Serialize)]
struct HeaderOutput {
    kind: &'static str,
    key_ref: Option<String>,
    key_ref_hex: Option<String>,
    key_ref_len: usize,
    body_size: usize,
    wire_size: usize,
}

impl HeaderOutput {
    fn new(envelope: &Envelope) -> Self {
        let key_ref = envelope.key_ref();
        Self {
            kind: envelope_kind(envelope),
            key_ref: key_ref.map(ToString::to_string),
            key_ref_hex: key_ref.map(|key_ref| hex::encode(key_ref.as_bytes())),
            key_ref_len: key_ref.map_or(0, KeyRef::len),
            body_size: envelope.body().len(),
            wire_size: envelope.wire_size(),
        }
    }
}

#[derive(Serialize)]
struct SealedOutput<'a> {
    key_ref: Option<String>,
    envelope_hex: String,
    envelope_size: usize,
    payload_size: usize,
    #[serde(skip)]
    envelope: &'a [u8],
}

#[derive(Serialize)]
struct OpenedOutput<'a> {
    key_ref: Option<String>,
    payload_size: usize,
    payload: String,
    #[serde(skip)]
    raw: &'a [u8],
}

#[derive(Serialize)]
struct KeyFileOutput<'a> {
    name: &'a str,
    path: String,
    key_len: usize,
}

pub fn print_header(envelope: &Envelope, format: OutputFormat) {
    let out = HeaderOutput::new(envelope);
    match format {
        OutputFormat::Json | OutputFormat::Raw => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "KEY REF", "KEY REF LEN", "BODY", "WIRE"])
                .add_row(vec![
                    out.kind.to_string(),
                    out.key_ref.clone().unwrap_or_else(|| "-".to_string()),
                    out.key_ref_len.to_string(),
                    out.body_size.to_string(),
                    out.wire_size.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "kind={} key_ref={} key_ref_len={} body={} wire={}",
                out.kind,
                out.key_ref.as_deref().unwrap_or("-"),
                out.key_ref_len,
                out.body_size,
                out.wire_size
            );
        }
    }
}

pub fn print_sealed(key_ref: Option<&KeyRef>, envelope: &[u8], payload_size: usize, format: OutputFormat) {
    let out = SealedOutput {
        key_ref: key_ref.map(ToString::to_string),
        envelope_hex: hex::encode(envelope),
        envelope_size: envelope.len(),
        payload_size,
        envelope,
    };
    match format {
        OutputFormat::Raw => print_raw(out.envelope),
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KEY REF", "PAYLOAD", "ENVELOPE", "HEX"])
                .add_row(vec![
                    out.key_ref.clone().unwrap_or_else(|| "-".to_string()),
                    out.payload_size.to_string(),
                    out.envelope_size.to_string(),
                    out.envelope_hex.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", out.envelope_hex),
    }
}

pub fn print_opened(key_ref: Option<&KeyRef>, payload: &[u8], format: OutputFormat) {
    let out = OpenedOutput {
        key_ref: key_ref.map(ToString::to_string),
        payload_size: payload.len(),
        payload: payload_preview(payload),
        raw: payload,
    };
    match format {
        OutputFormat::Raw => print_raw(out.raw),
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KEY REF", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    out.key_ref.clone().unwrap_or_else(|| "-".to_string()),
                    out.payload_size.to_string(),
                    out.payload.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "key_ref={} size={} payload={}",
                out.key_ref.as_deref().unwrap_or("-"),
                out.payload_size,
                out.payload
            );
        }
    }
}

pub fn print_key_file(name: &str, path: &Path, key_len: usize, format: OutputFormat) {
    let out = KeyFileOutput {
        name,
        path: path.display().to_string(),
        key_len,
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["NAME", "PATH", "BYTES"])
                .add_row(vec![out.name.to_string(), out.path.clone(), key_len.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => println!("{}", out.path),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json(value: &impl Serialize) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn envelope_kind(envelope: &Envelope) -> &'static str {
    match envelope {
        Envelope::Raw(_) => "raw",
        Envelope::Plain(_) => "plain",
        Envelope::Sealed { .. } => "sealed",
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}
