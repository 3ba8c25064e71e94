use rectypes_schema::{DeriveConfig, SchemaDeriver, DRAFT_07};
use serde_json::Value;

use crate::cmd::{load_registry, lookup_type, SchemaArgs};
use crate::exit::{schema_error, CliResult, SUCCESS};
use crate::output::{print_document, OutputFormat};

pub fn run(args: SchemaArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = load_registry(&args.definitions)?;
    let record_type = lookup_type(&registry, &args.type_name)?;

    let deriver = SchemaDeriver::with_config(DeriveConfig {
        strict_mode: args.strict,
        include_titles: args.titles,
        dialect: Some(DRAFT_07.to_string()),
    });
    let document = deriver
        .derive(record_type)
        .map_err(|err| schema_error(&format!("derive {}", args.type_name), err))?;

    print_document(&Value::Object(document), format);
    Ok(SUCCESS)
}
