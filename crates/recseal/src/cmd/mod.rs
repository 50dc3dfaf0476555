use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Subcommand};
use recseal_crypto::AesGcmAlgorithm;
use recseal_keys::{MemoryKeyRepository, PlainKeyNames, RepositoryKeyProvider};
use tracing::{debug, warn};

use crate::exit::{io_error, key_store_error, CliError, CliResult, DATA_INVALID};
use crate::output::OutputFormat;

pub mod inspect;
pub mod keygen;
pub mod open;
pub mod seal;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encrypt a payload into an envelope.
    Seal(SealArgs),
    /// Decrypt an envelope.
    Open(OpenArgs),
    /// Print an envelope header without decrypting.
    Inspect(InspectArgs),
    /// Generate a random key file in the key directory.
    Keygen(KeygenArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Key material and cipher settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct CryptoOptions {
    pub key_dir: Option<PathBuf>,
    pub aad: Option<String>,
}

impl CryptoOptions {
    pub fn algorithm(&self) -> AesGcmAlgorithm {
        match &self.aad {
            Some(aad) => AesGcmAlgorithm::with_aad(aad.as_bytes()),
            None => AesGcmAlgorithm::new(),
        }
    }

    /// Keys loaded from `--key-dir`, or an empty repository when unset.
    pub fn repository(&self) -> CliResult<MemoryKeyRepository> {
        let Some(dir) = &self.key_dir else {
            warn!("no key directory configured, no key will resolve");
            return Ok(MemoryKeyRepository::new());
        };
        let repository = MemoryKeyRepository::from_directory(dir)
            .map_err(|err| key_store_error("failed loading keys", err))?;
        debug!(dir = %dir.display(), keys = repository.len(), "loaded key directory");
        Ok(repository)
    }

    pub fn key_provider(
        &self,
    ) -> CliResult<Arc<RepositoryKeyProvider<MemoryKeyRepository, PlainKeyNames>>> {
        Ok(Arc::new(RepositoryKeyProvider::new(
            self.repository()?,
            PlainKeyNames,
        )))
    }
}

pub fn run(command: Command, options: &CryptoOptions, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Seal(args) => seal::run(args, options, format),
        Command::Open(args) => open::run(args, options, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Keygen(args) => keygen::run(args, options, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SealArgs {
    /// Key name to seal under. Omit to frame the payload without encryption.
    pub key_ref: Option<String>,
    /// Raw string payload.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload from file. Default: stdin.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
}

/// Source of an envelope: hex on the command line, a file, or stdin.
#[derive(Args, Debug)]
pub struct EnvelopeInput {
    /// Hex-encoded envelope.
    #[arg(long, conflicts_with = "file")]
    pub data_hex: Option<String>,
    /// Read envelope bytes from file. Default: stdin.
    #[arg(long, conflicts_with = "data_hex")]
    pub file: Option<PathBuf>,
}

impl EnvelopeInput {
    pub fn read(&self) -> CliResult<Vec<u8>> {
        if let Some(data_hex) = &self.data_hex {
            return hex::decode(data_hex.trim()).map_err(|err| {
                CliError::new(DATA_INVALID, format!("--data-hex is not valid hex: {err}"))
            });
        }
        read_file_or_stdin(self.file.as_ref())
    }
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    #[command(flatten)]
    pub input: EnvelopeInput,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub input: EnvelopeInput,
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Key name; the key is written to `<KEY_DIR>/<NAME>.key`.
    pub name: String,
    /// Replace an existing key file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn read_file_or_stdin(file: Option<&PathBuf>) -> CliResult<Vec<u8>> {
    match file {
        Some(path) => std::fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err)),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("failed reading stdin", err))?;
            Ok(buf)
        }
    }
}
