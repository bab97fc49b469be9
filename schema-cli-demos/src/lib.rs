//! Demo tools for schema-cli
//!
//! Each module defines one model and a `runner()` that wires it up; the
//! binaries under `src/bin` just run those runners against the process
//! arguments.

pub mod boolean;
pub mod boolean_custom;
pub mod custom;
pub mod enums;
pub mod json_config;
pub mod json_config_not_found;
pub mod list;
pub mod logging;
pub mod rich_schema;
pub mod simple;
pub mod subcommands;

/// Version reported by every demo's `--version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) fn default_true() -> bool {
    true
}
