use crate::cmd::{load_registry, TypesArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_types, OutputFormat, TypeSummary};

pub fn run(args: TypesArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = load_registry(&args.definitions)?;
    let summaries: Vec<TypeSummary> = registry
        .types()
        .map(|record_type| TypeSummary::of(record_type))
        .collect();
    print_types(&summaries, format);
    Ok(SUCCESS)
}
