//! JSON config presets
//!
//! `--json-training /path/to/file.json` loads field values from a file. Fields
//! present in the file are no longer required on the command line, and an
//! explicit flag still overrides the file. The file path can also come from
//! the `PCLI_JSON_CONFIG` environment variable.
//!
//! ```bash
//! demo-json-config --json-training preset.json --hdf_file /path/to/file.hdf5
//! ```

use schema_cli::{to_runner, CliConfig, CliModel, Cmd, Runner};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::logging::{epilogue_handler, prologue_handler};

pub const JSON_KEY: &str = "json-training";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Opts {
    pub hdf_file: String,
    #[serde(default = "default_max_records")]
    pub max_records: i64,
    pub min_filter_score: f64,
    pub alpha: f64,
    pub beta: f64,
}

fn default_max_records() -> i64 {
    10
}

impl CliModel for Opts {
    fn cli_config() -> CliConfig {
        CliConfig::new().json_enable(true).json_key(JSON_KEY)
    }
}

impl Cmd for Opts {
    fn run(&self) -> anyhow::Result<()> {
        println!("Running with opts:{self:?}");
        Ok(())
    }
}

pub fn runner() -> Runner {
    to_runner::<Opts>()
        .name("demo-json-config")
        .description("My Tool Description")
        .version(crate::VERSION)
        .prologue_handler(prologue_handler)
        .epilogue_handler(epilogue_handler)
}
