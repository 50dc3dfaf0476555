use std::sync::Arc;

use bytes::Bytes;
use recseal_crypto::{DefaultDecryptor, EnvelopeDecoder};

use crate::cmd::{CryptoOptions, OpenArgs};
use crate::exit::{crypto_error, envelope_error, CliResult, SUCCESS};
use crate::output::{print_opened, OutputFormat};

pub fn run(args: OpenArgs, options: &CryptoOptions, format: OutputFormat) -> CliResult<i32> {
    let data = args.input.read()?;

    let decoder = EnvelopeDecoder::new(Arc::new(DefaultDecryptor::new(
        options.key_provider()?,
        options.algorithm(),
    )));
    let opened = decoder
        .decode(Bytes::from(data))
        .map_err(|err| envelope_error("open failed", err))?;

    match opened.payload {
        Ok(plaintext) => {
            print_opened(opened.key_ref.as_ref(), &plaintext, format);
            Ok(SUCCESS)
        }
        Err(err) => Err(crypto_error("open failed", err)),
    }
}
