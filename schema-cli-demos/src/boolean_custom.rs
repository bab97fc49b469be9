//! Custom flags, descriptions and every flavor of boolean
//!
//! - `alpha`, `gamma` and `zeta_mode` have no default: exactly one of
//!   `--enable-<field>` / `--disable-<field>` must be given
//! - `beta_filter` defaults to `false` and is switched on with `-b/--beta-filter`
//! - `delta` is optional and stays `None` unless one of its switches is given
//! - `epsilon` uses a custom (enable, disable) pair; only `--epsilon` is
//!   registered since `--disable-epsilon` would store the default

use schema_cli::{
    default_minimal_exception_handler, to_runner, CliConfig, CliModel, Cmd, Runner,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::enums::State;
use crate::logging::prologue_handler;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Options {
    pub input_file: String,
    /// Path to input HDF5 file
    pub input_file2: String,
    /// Path to input H5 file
    pub input_file3: String,
    #[serde(default)]
    pub outfile: Option<String>,
    #[serde(default)]
    pub fasta: Option<String>,
    /// Nullable, but still required since it has no default
    pub report_json: Option<String>,
    pub alpha: bool,
    /// Enable beta filter mode
    #[serde(default)]
    pub beta_filter: bool,
    pub gamma: bool,
    #[serde(default)]
    pub delta: Option<bool>,
    /// Enable/Disable Zeta mode to experimental filtering mode.
    pub zeta_mode: bool,
    /// Enable epsilon meta-analysis.
    #[serde(default)]
    pub epsilon: bool,
    pub states: BTreeSet<State>,
    pub filter_mode: String,
}

impl CliModel for Options {
    fn cli_config() -> CliConfig {
        CliConfig::new()
            .flag("input_file3", ["-f", "--hdf5"])
            .flag("beta_filter", ["-b", "--beta-filter"])
            .flag("epsilon", ["--epsilon", "--disable-epsilon"])
    }
}

impl Cmd for Options {
    fn run(&self) -> anyhow::Result<()> {
        println!("Mock example running with {self:?}");
        Ok(())
    }
}

pub fn runner() -> Runner {
    to_runner::<Options>()
        .name("demo-boolean-custom")
        .description(
            "Example Commandline tool for demonstrating how custom fields/flags are communicated",
        )
        .version("2.0.0")
        .exception_handler(default_minimal_exception_handler)
        .prologue_handler(prologue_handler)
}
