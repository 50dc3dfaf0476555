use std::fs::OpenOptions;
use std::io::Write;

use recseal_keys::{KeyGenerator, MemoryKeyRepository, RandomKeyGenerator};
use tracing::info;

use crate::cmd::{CryptoOptions, KeygenArgs};
use crate::exit::{io_error, key_store_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_key_file, OutputFormat};

pub fn run(args: KeygenArgs, options: &CryptoOptions, format: OutputFormat) -> CliResult<i32> {
    let Some(dir) = &options.key_dir else {
        return Err(CliError::new(
            USAGE,
            "keygen requires --key-dir (or RECSEAL_KEY_DIR)",
        ));
    };

    let key = RandomKeyGenerator::default().generate_key();
    // Same name and length rules the loader applies.
    MemoryKeyRepository::new()
        .insert(&args.name, key.clone())
        .map_err(|err| key_store_error("invalid key", err))?;

    std::fs::create_dir_all(dir)
        .map_err(|err| io_error(&format!("failed creating {}", dir.display()), err))?;
    let path = dir.join(format!("{}.key", args.name));

    let mut open = OpenOptions::new();
    open.write(true);
    if args.force {
        open.create(true).truncate(true);
    } else {
        open.create_new(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        open.mode(0o600);
    }

    let mut file = open
        .open(&path)
        .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
    writeln!(file, "{}", hex::encode(&key))
        .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;

    info!(name = %args.name, path = %path.display(), "generated key");
    print_key_file(&args.name, &path, key.len(), format);
    Ok(SUCCESS)
}
