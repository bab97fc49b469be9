//! Schema-driven command-line parsing
//!
//! This crate turns a serde data model into a `clap` command-line parser,
//! parses the process arguments into a validated instance of the model and
//! runs a handler with it. The model's JSON Schema (derived with `schemars`)
//! is the single source of truth: every property becomes a flag, its type
//! drives value coercion, and its `required` list and defaults decide which
//! flags must be given.
//!
//! # Features
//!
//! - **Flag synthesis**: `--field_name` for every field, custom short/long/positional
//!   tokens through [`CliConfig::flag`] or an `x-cli` schema extension
//! - **Booleans**: `--enable-x` / `--disable-x` switches derived from the field default
//! - **JSON config**: a `--json-config` file (or environment variable) supplies
//!   field values; explicit flags still win
//! - **Validation**: JSON Schema validation with `jsonschema`, then [`CliModel::validate`]
//! - **Hooks**: exception, prologue and epilogue handlers around the user handler
//! - **Shell completion**: eager `--emit-completion <shell>` through `clap_complete`
//! - **Sub-commands**: one model per named sub-command
//!
//! # Quick Start
//!
//! ```no_run
//! use schema_cli::{run_and_exit, CliModel, Cmd};
//! use schemars::JsonSchema;
//! use serde::{Deserialize, Serialize};
//!
//! /// Process records from an input file
//! #[derive(Debug, Serialize, Deserialize, JsonSchema)]
//! struct Options {
//!     input_file: String,
//!     #[serde(default = "default_max_records")]
//!     max_records: u32,
//! }
//!
//! fn default_max_records() -> u32 {
//!     10
//! }
//!
//! impl CliModel for Options {}
//!
//! impl Cmd for Options {
//!     fn run(&self) -> anyhow::Result<()> {
//!         println!("Processing {} ({} records)", self.input_file, self.max_records);
//!         Ok(())
//!     }
//! }
//!
//! fn main() {
//!     run_and_exit::<Options>()
//! }
//! ```
//!
//! Exit codes: `0` on success, the handler's own code when it returns one,
//! the code carried by a [`FailedExecution`] error, and otherwise whatever
//! the exception handler decides (`1` for the default handlers).

pub mod builder;
mod completion;
pub mod config;
pub mod conversion;
pub mod error;
pub mod exit_codes;
pub mod flags;
pub mod handlers;
pub mod model;
pub mod overrides;
pub mod runner;
pub mod schema;
mod subcommands;
pub mod validation;

pub use builder::{FieldBinding, ModelParser, ParserBuilder};
pub use completion::{print_completion, requested_shell, write_completion};
pub use config::CliConfig;
pub use conversion::{ConversionError, ParsedArgs};
pub use error::{
    ConfigurationError, ErrorSeverity, FailedExecution, FieldError, Severity, ValidationError,
};
pub use exit_codes::{EXIT_ERROR, EXIT_SUCCESS};
pub use handlers::{
    default_epilogue_handler, default_exception_handler, default_minimal_exception_handler,
    default_prologue_handler, os_error_exception_handler,
};
pub use model::{CliModel, Cmd, CmdSpec, Model};
pub use overrides::{resolve_overrides, LongFlags, ResolvedOverrides};
pub use runner::{run_and_exit, to_runner, ExitOutcome, Runner, Stage};
pub use schema::{FieldDescriptor, FieldType, Schema, SchemaError};
pub use subcommands::SUBCOMMAND_KEY;

/// Shell names accepted by the completion flag
pub use clap_complete::Shell;
