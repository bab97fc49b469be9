//! Shared harness for the demo tests

#![allow(dead_code)]

use schema_cli::{default_epilogue_handler, default_prologue_handler, Runner};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Environment variable the demos read a JSON config path from
pub const JSON_CONFIG_ENV_VAR: &str = "PCLI_JSON_CONFIG";

/// Run `runner` in-process with the default hooks and check the exit code
pub fn run_config(runner: Runner, args: &[&str], exit_code: i32) {
    let runner = runner
        .prologue_handler(default_prologue_handler)
        .epilogue_handler(default_epilogue_handler);
    assert_eq!(
        runner.run(args.iter().copied()),
        exit_code,
        "unexpected exit code for {args:?}"
    );
}

/// Temporary JSON file holding `value`
pub struct TempJson {
    file: NamedTempFile,
}

impl TempJson {
    pub fn new(value: &serde_json::Value) -> Self {
        let mut file = NamedTempFile::new().unwrap();
        serde_json::to_writer(&mut file, value).unwrap();
        file.flush().unwrap();
        Self { file }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn path_str(&self) -> &str {
        self.file.path().to_str().unwrap()
    }
}
