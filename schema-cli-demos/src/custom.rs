//! Custom short/long flags plus logging hooks
//!
//! The prologue sets up logging at the level selected with `--log_level`;
//! the epilogue logs the exit code and run time.
//!
//! ```bash
//! demo-custom -i file.fasta -f 1.5 --log_level DEBUG
//! ```

use schema_cli::{to_runner, CliConfig, CliModel, Cmd, Model, Runner};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::logging::{epilogue_handler, init_logging, LogLevel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Options {
    pub input_file: String,
    #[serde(default = "default_max_records")]
    pub max_records: i64,
    pub min_filter_score: f64,
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_max_records() -> i64 {
    10
}

impl CliModel for Options {
    fn cli_config() -> CliConfig {
        CliConfig::new()
            .flag("input_file", ["-i", "--input"])
            .flag("max_records", ["-m", "--max-records"])
            .flag("min_filter_score", ["-f", "--filter-score"])
    }
}

impl Cmd for Options {
    fn run(&self) -> anyhow::Result<()> {
        info!(
            "schema-cli version={} Mock example running with options {self:?}",
            crate::VERSION
        );
        Ok(())
    }
}

/// Set up logging from the parsed options
pub fn setup_logging(model: &dyn Model) -> anyhow::Result<()> {
    let level = model
        .as_any()
        .downcast_ref::<Options>()
        .map(|opts| opts.log_level)
        .unwrap_or_default();
    init_logging(level);
    info!("Set up log with level {level}");
    Ok(())
}

pub fn runner() -> Runner {
    to_runner::<Options>()
        .name("demo-custom")
        .description("Custom flags with logging set up from a prologue hook")
        .version(crate::VERSION)
        .prologue_handler(setup_logging)
        .epilogue_handler(epilogue_handler)
}
