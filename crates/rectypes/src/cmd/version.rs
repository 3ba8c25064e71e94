use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("rectypes {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: rectypes");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("RECTYPES_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("features: schema={}, cli=true", cfg!(feature = "schema"));

    Ok(SUCCESS)
}
