//! Optional global config file
//!
//! The declared config path does not exist and path validation is off, so
//! the file is skipped with a warning instead of failing the run.

use schema_cli::{CliConfig, CliModel, CmdSpec, Runner, EXIT_SUCCESS};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const MISSING_CONFIG_PATH: &str = "/path/to/file/that/does/not/exist/simple_schema.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Options {
    pub input_file: String,
    #[serde(default = "default_max_records")]
    pub max_records: i64,
}

fn default_max_records() -> i64 {
    10
}

impl CliModel for Options {
    fn cli_config() -> CliConfig {
        CliConfig::new()
            .json_enable(true)
            .json_config_path(MISSING_CONFIG_PATH)
            .json_validate_path(false)
    }
}

pub fn example_runner(opts: Options) -> anyhow::Result<i32> {
    info!("Mock example running with options {opts:?}");
    Ok(EXIT_SUCCESS)
}

pub fn runner() -> Runner {
    Runner::new(CmdSpec::with_handler(example_runner))
        .name("demo-json-config-not-found")
        .description("Description")
        .version(crate::VERSION)
}
