//! Enum-valued fields
//!
//! Choices are case sensitive and listed in `--help`. A set-valued field
//! takes one or more tokens; repeated tokens collapse.
//!
//! ```bash
//! demo-enum --states RUNNING FAILED --mode alpha
//! ```

use schema_cli::{to_runner, CliModel, Cmd, Runner};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[allow(clippy::upper_case_acronyms)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum State {
    RUNNING,
    FAILED,
    SUCCESSFUL,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Alpha,
    Beta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Options {
    pub states: BTreeSet<State>,
    pub mode: Mode,
    #[serde(default = "default_max_records")]
    pub max_records: i64,
}

fn default_max_records() -> i64 {
    100
}

impl CliModel for Options {}

impl Cmd for Options {
    fn run(&self) -> anyhow::Result<()> {
        println!("Mock example running with {self:?}");
        Ok(())
    }
}

pub fn runner() -> Runner {
    to_runner::<Options>()
        .name("demo-enum")
        .description("Enum and set-of-enum fields")
        .version(crate::VERSION)
}
