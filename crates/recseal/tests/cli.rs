#![cfg(feature = "cli")]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "recseal-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn recseal(key_dir: Option<&Path>, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_recseal"));
    command
        .env_remove("RECSEAL_KEY_DIR")
        .env_remove("RECSEAL_AAD")
        .arg("--log-level")
        .arg("off");
    if let Some(dir) = key_dir {
        command.arg("--key-dir").arg(dir);
    }
    command.args(args).output().expect("recseal should run")
}

#[test]
fn keygen_seal_open_roundtrip() {
    let dir = unique_temp_dir("roundtrip");
    let keys = dir.join("keys");

    let keygen = recseal(Some(&keys), &["--format", "json", "keygen", "acct-7"]);
    assert!(keygen.status.success(), "{keygen:?}");
    let key_hex = std::fs::read_to_string(keys.join("acct-7.key")).expect("key file");
    assert_eq!(key_hex.trim().len(), 64);

    let sealed = recseal(
        Some(&keys),
        &["--format", "raw", "seal", "acct-7", "--data", "hello, recseal"],
    );
    assert!(sealed.status.success(), "{sealed:?}");
    assert!(sealed.stdout.starts_with(&[0x2B, 0x45, 0x2B, 0x1B, 0x2B, 0x46]));
    assert!(!String::from_utf8_lossy(&sealed.stdout).contains("hello, recseal"));

    let envelope = dir.join("envelope.bin");
    std::fs::write(&envelope, &sealed.stdout).expect("write envelope");

    let opened = recseal(
        Some(&keys),
        &["--format", "raw", "open", "--file", envelope.to_str().unwrap()],
    );
    assert!(opened.status.success(), "{opened:?}");
    assert_eq!(opened.stdout, b"hello, recseal");

    let inspected = recseal(
        None,
        &["--format", "json", "inspect", "--file", envelope.to_str().unwrap()],
    );
    assert!(inspected.status.success());
    let header: serde_json::Value =
        serde_json::from_slice(&inspected.stdout).expect("inspect prints json");
    assert_eq!(header["kind"], "sealed");
    assert_eq!(header["key_ref"], "acct-7");
    assert_eq!(header["key_ref_len"], 6);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn seal_without_key_ref_frames_plaintext() {
    let sealed = recseal(None, &["--format", "json", "seal", "--data", "world"]);
    assert!(sealed.status.success(), "{sealed:?}");

    let out: serde_json::Value = serde_json::from_slice(&sealed.stdout).expect("json");
    assert_eq!(out["envelope_hex"], "2b452b1b2b4600000000776f726c64");
    assert!(out["key_ref"].is_null());

    let opened = recseal(
        None,
        &["--format", "raw", "open", "--data-hex", "2b452b1b2b4600000000776f726c64"],
    );
    assert!(opened.status.success());
    assert_eq!(opened.stdout, b"world");
}

#[test]
fn open_passes_unframed_input_through() {
    let opened = recseal(None, &["--format", "raw", "open", "--data-hex", "68656c6c6f"]);
    assert!(opened.status.success());
    assert_eq!(opened.stdout, b"hello");
}

#[test]
fn unknown_key_fails_with_crypto_exit_code() {
    let dir = unique_temp_dir("unknown");

    let sealed = recseal(Some(&dir), &["seal", "missing", "--data", "secret"]);
    assert_eq!(sealed.status.code(), Some(3));
    assert!(sealed.stdout.is_empty());
    assert!(String::from_utf8_lossy(&sealed.stderr).contains("missing"));

    // Sealed frame for key "K1" with a bogus body.
    let opened = recseal(
        Some(&dir),
        &["open", "--data-hex", "2b452b1b2b46000000024b31deadbeef"],
    );
    assert_eq!(opened.status.code(), Some(3));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn truncated_envelope_is_data_invalid() {
    let inspected = recseal(None, &["inspect", "--data-hex", "2b452b1b2b4600000010"]);
    assert_eq!(inspected.status.code(), Some(60));

    let bad_hex = recseal(None, &["inspect", "--data-hex", "zz"]);
    assert_eq!(bad_hex.status.code(), Some(60));
}

#[test]
fn keygen_requires_key_dir_and_refuses_overwrite() {
    let missing_dir = recseal(None, &["keygen", "acct-7"]);
    assert_eq!(missing_dir.status.code(), Some(64));

    let dir = unique_temp_dir("keygen");
    assert!(recseal(Some(&dir), &["keygen", "acct-7"]).status.success());
    assert_eq!(
        recseal(Some(&dir), &["keygen", "acct-7"]).status.code(),
        Some(1)
    );
    assert!(recseal(Some(&dir), &["keygen", "acct-7", "--force"])
        .status
        .success());

    let bad_name = recseal(Some(&dir), &["keygen", "../escape"]);
    assert_eq!(bad_name.status.code(), Some(64));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn aad_must_match_between_seal_and_open() {
    let dir = unique_temp_dir("aad");
    assert!(recseal(Some(&dir), &["keygen", "K1"]).status.success());

    let sealed = recseal(
        Some(&dir),
        &["--format", "raw", "--aad", "orders", "seal", "K1", "--data", "v"],
    );
    assert!(sealed.status.success());
    let envelope_hex: String = sealed.stdout.iter().map(|b| format!("{b:02x}")).collect();

    let wrong = recseal(Some(&dir), &["open", "--data-hex", &envelope_hex]);
    assert_eq!(wrong.status.code(), Some(3));

    let right = recseal(
        Some(&dir),
        &["--format", "raw", "--aad", "orders", "open", "--data-hex", &envelope_hex],
    );
    assert!(right.status.success());
    assert_eq!(right.stdout, b"v");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_package_version() {
    let output = recseal(None, &["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
