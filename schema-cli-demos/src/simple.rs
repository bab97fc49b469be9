//! Two required flags
//!
//! ```bash
//! demo-simple --input_file file.fasta --max_records 10
//! ```

use schema_cli::{CliModel, CmdSpec, Runner, EXIT_SUCCESS};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DESCRIPTION: &str = "Simple example with two required arguments";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Options {
    pub input_file: String,
    pub max_records: i64,
}

impl CliModel for Options {}

pub fn example_runner(opts: Options) -> anyhow::Result<i32> {
    println!("Mock example running with {opts:?}");
    Ok(EXIT_SUCCESS)
}

pub fn runner() -> Runner {
    Runner::new(CmdSpec::with_handler(example_runner))
        .name("demo-simple")
        .description(DESCRIPTION)
        .version(crate::VERSION)
}
