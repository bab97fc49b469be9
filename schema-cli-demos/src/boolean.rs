//! Booleans with defaults
//!
//! A field defaulting to `true` gets a `--disable-<field>` switch; one
//! defaulting to `false` gets `--enable-<field>`.
//!
//! ```bash
//! demo-boolean --input_file file.fasta --disable-run_training --enable-dry_run
//! ```

use schema_cli::{CliModel, CmdSpec, Runner, EXIT_SUCCESS};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Options {
    pub input_file: String,
    #[serde(default = "crate::default_true")]
    pub run_training: bool,
    #[serde(default)]
    pub dry_run: bool,
}

impl CliModel for Options {}

pub fn example_runner(opts: Options) -> anyhow::Result<i32> {
    println!("Mock example running with {opts:?}");
    Ok(EXIT_SUCCESS)
}

pub fn runner() -> Runner {
    Runner::new(CmdSpec::with_handler(example_runner))
        .name("demo-boolean")
        .description("Boolean switches derived from field defaults")
        .version(crate::VERSION)
}
