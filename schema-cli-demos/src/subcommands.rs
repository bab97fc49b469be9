//! One model per sub-command
//!
//! ```bash
//! demo-subcommands alpha --help
//! demo-subcommands beta --url http://example.com -n 3
//! ```

use schema_cli::{CliConfig, CliModel, Cmd, CmdSpec, Runner};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::logging::{prologue_handler, LogLevel};

fn shared_config() -> CliConfig {
    CliConfig::new().json_enable(true)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AlphaOptions {
    pub input_file: String,
    #[serde(default = "default_max_records")]
    pub max_records: i64,
    #[serde(default = "debug_level")]
    pub log_level: LogLevel,
}

fn default_max_records() -> i64 {
    10
}

fn debug_level() -> LogLevel {
    LogLevel::Debug
}

impl CliModel for AlphaOptions {
    fn cli_config() -> CliConfig {
        shared_config()
            .flag("input_file", ["-i", "--input"])
            .flag("max_records", ["-m", "--max-records"])
    }
}

impl Cmd for AlphaOptions {
    fn run(&self) -> anyhow::Result<()> {
        println!("Mock example running with {self:?}");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BetaOptions {
    pub url: String,
    #[serde(default = "default_num_retries")]
    pub num_retries: i64,
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_num_retries() -> i64 {
    3
}

impl CliModel for BetaOptions {
    fn cli_config() -> CliConfig {
        shared_config()
            .flag("url", ["-u", "--url"])
            .flag("num_retries", ["-n", "--num-retries"])
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.url.contains("://"),
            "url must include a scheme, got '{}'",
            self.url
        );
        Ok(())
    }
}

impl Cmd for BetaOptions {
    fn run(&self) -> anyhow::Result<()> {
        println!("Mock example running with {self:?}");
        Ok(())
    }
}

pub fn runner() -> Runner {
    Runner::subcommands([
        (
            "alpha",
            CmdSpec::from_cmd::<AlphaOptions>().description("Process an input file"),
        ),
        (
            "beta",
            CmdSpec::from_cmd::<BetaOptions>().description("Fetch from a URL"),
        ),
    ])
    .name("demo-subcommands")
    .description("Example of using sub-commands, one model each")
    .version(crate::VERSION)
    .prologue_handler(prologue_handler)
}
