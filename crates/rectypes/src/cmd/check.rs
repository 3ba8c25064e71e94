use std::io::Read;

use rectypes_core::{decode_record, serialize, serialize_pretty};
use rectypes_schema::SchemaRegistry;
use serde_json::Value;
use tracing::debug;

use crate::cmd::{load_registry, lookup_type, CheckArgs};
use crate::exit::{codec_error, io_error, schema_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = load_registry(&args.definitions)?;
    let record_type = lookup_type(&registry, &args.type_name)?;
    let text = read_instance(&args.instance)?;

    if args.schema {
        let mut schemas = SchemaRegistry::new();
        schemas
            .register(record_type)
            .map_err(|err| schema_error(&format!("derive {}", args.type_name), err))?;
        schemas
            .validate(&args.type_name, text.as_bytes())
            .map_err(|err| schema_error("schema check", err))?;
        debug!(type_name = %args.type_name, "instance passed schema validation");
    }

    let raw: Value = serde_json::from_str(&text)
        .map_err(|err| CliError::new(DATA_INVALID, format!("parse instance: {err}")))?;
    let record = decode_record(record_type, &raw)
        .map_err(|err| codec_error(&format!("invalid {}", args.type_name), err))?;

    let encoded = match format {
        OutputFormat::Json => serialize(&record),
        OutputFormat::Table | OutputFormat::Pretty => serialize_pretty(&record),
    }
    .map_err(|err| codec_error("encode record", err))?;
    println!("{encoded}");
    Ok(SUCCESS)
}

fn read_instance(source: &str) -> CliResult<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| io_error("read stdin", err))?;
        return Ok(text);
    }
    std::fs::read_to_string(source).map_err(|err| io_error(&format!("read {source}"), err))
}
