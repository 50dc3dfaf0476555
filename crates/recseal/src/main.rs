mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::{Command, CryptoOptions};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "recseal", version, about = "Seal and open encrypted record envelopes")]
struct Cli {
    /// Output format. Default: table on a terminal, raw bytes otherwise.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Directory of `<name>.key` files holding hex-encoded 32-byte keys.
    #[arg(long, value_name = "DIR", env = "RECSEAL_KEY_DIR", global = true)]
    key_dir: Option<PathBuf>,

    /// Associated data bound to every sealed payload.
    #[arg(long, value_name = "STRING", env = "RECSEAL_AAD", global = true)]
    aad: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let options = CryptoOptions {
        key_dir: cli.key_dir,
        aad: cli.aad,
    };
    let result = cmd::run(cli.command, &options, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
