use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("recseal {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: recseal");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("RECSEAL_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("envelope_magic: {}", hex::encode(recseal_envelope::MAGIC));
    println!(
        "cipher: AES-256-GCM (key {} bytes, nonce {} bytes)",
        recseal_crypto::KEY_LEN,
        recseal_crypto::NONCE_LEN
    );

    Ok(SUCCESS)
}
