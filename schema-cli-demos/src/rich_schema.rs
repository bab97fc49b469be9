//! Rich field metadata
//!
//! Doc comments become the help text of each flag, and range constraints
//! are enforced when the model is validated (`max_records` must be at least 1).
//! Shell completion is enabled: `--emit-completion zsh` prints a script.

use schema_cli::{CliConfig, CliModel, CmdSpec, Runner, EXIT_SUCCESS};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Options {
    /// Input File
    ///
    /// Path to the input file
    pub input_file: String,
    /// Max Records
    ///
    /// Max number of records
    #[serde(default = "default_max_records")]
    #[schemars(range(min = 1))]
    pub max_records: i64,
    /// Min Score
    ///
    /// Minimum Score Filter that will be applied to the records
    #[schemars(range(min = 0.0))]
    pub min_filter_score: f64,
    /// Max Score
    ///
    /// Maximum Score Filter that will be applied to the records
    #[serde(default)]
    #[schemars(range(min = 0.0))]
    pub max_filter_score: Option<f64>,
    /// Filter Name
    ///
    /// Name to Filter on.
    pub name: Option<String>,
}

fn default_max_records() -> i64 {
    123
}

impl CliModel for Options {
    fn cli_config() -> CliConfig {
        CliConfig::new()
            .shell_completion(true)
            .flag("input_file", ["-f", "--input-file"])
            .flag("max_records", ["-m"])
            .flag("min_filter_score", ["-s", "--min-filter-score"])
            .flag("max_filter_score", ["-S", "--max-filter-score"])
            .flag("name", ["-n", "--filter-name"])
    }

    fn validate(&self) -> anyhow::Result<()> {
        if let Some(max) = self.max_filter_score {
            anyhow::ensure!(
                max >= self.min_filter_score,
                "max_filter_score ({max}) must not be below min_filter_score ({})",
                self.min_filter_score
            );
        }
        Ok(())
    }
}

pub fn example_runner(opts: Options) -> anyhow::Result<i32> {
    println!("Mock example running with options {opts:?}");
    Ok(EXIT_SUCCESS)
}

pub fn runner() -> Runner {
    Runner::new(CmdSpec::with_handler(example_runner))
        .name("demo-rich-schema")
        .description("Field metadata shown in --help and enforced on validation")
        .version(crate::VERSION)
}
