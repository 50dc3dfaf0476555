use bytes::Bytes;
use recseal_envelope::decode_envelope;

use crate::cmd::InspectArgs;
use crate::exit::{envelope_error, CliResult, SUCCESS};
use crate::output::{print_header, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let data = args.input.read()?;
    let envelope =
        decode_envelope(Bytes::from(data)).map_err(|err| envelope_error("inspect failed", err))?;
    print_header(&envelope, format);
    Ok(SUCCESS)
}
