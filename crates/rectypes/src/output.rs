use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rectypes_core::RecordType;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
pub struct TypeSummary {
    pub name: String,
    pub fields: Vec<String>,
    pub required: Vec<String>,
    pub immutable: bool,
}

impl TypeSummary {
    pub fn of(record_type: &RecordType) -> Self {
        Self {
            name: record_type.name().to_string(),
            fields: record_type.fields().names().map(str::to_string).collect(),
            required: record_type
                .required_fields()
                .into_iter()
                .map(str::to_string)
                .collect(),
            immutable: record_type.is_immutable(),
        }
    }
}

pub fn print_types(types: &[TypeSummary], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(types).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "FIELDS", "REQUIRED", "IMMUTABLE"]);
            for summary in types {
                table.add_row(vec![
                    summary.name.clone(),
                    summary.fields.len().to_string(),
                    summary.required.join(", "),
                    summary.immutable.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for summary in types {
                println!(
                    "{} fields=[{}] required=[{}]{}",
                    summary.name,
                    summary.fields.join(", "),
                    summary.required.join(", "),
                    if summary.immutable { " immutable" } else { "" }
                );
            }
        }
    }
}

/// Print a JSON document, compact for `json` and indented otherwise.
pub fn print_document(document: &Value, format: OutputFormat) {
    let text = match format {
        OutputFormat::Json => serde_json::to_string(document),
        OutputFormat::Table | OutputFormat::Pretty => serde_json::to_string_pretty(document),
    };
    println!("{}", text.unwrap_or_else(|_| "{}".to_string()));
}
