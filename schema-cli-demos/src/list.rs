//! Sequence-valued fields
//!
//! ```bash
//! demo-list --input_file file.fasta file2.fasta --filters a b --max_records 10
//! ```

use schema_cli::{to_runner, CliModel, Cmd, Runner};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Options {
    pub input_file: Vec<String>,
    pub filters: BTreeSet<String>,
    pub max_records: i64,
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
        .name("demo-list")
        .description("List and set fields taking one or more values")
        .version(crate::VERSION)
}
