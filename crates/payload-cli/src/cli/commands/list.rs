use super::super::args::SourceArgs;
use super::super::sources::{load_config, populate};
use crate::exit_codes;
use payload_core::Payload;

pub fn run(args: SourceArgs) -> anyhow::Result<i32> {
    let payload = Payload::new(load_config(&args)?);
    populate(&payload, &args)?;
    for name in payload.ordered_file_names() {
        println!("{name}");
    }
    Ok(exit_codes::SUCCESS)
}
