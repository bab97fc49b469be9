//! Logging setup shared by the demo tools
//!
//! Logs go to stderr so stdout stays free for tool output (and completion scripts).

use schema_cli::Model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Log level selectable from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    #[default]
    Info,
    Debug,
    Warn,
    Error,
}

impl LogLevel {
    pub fn level(self) -> Level {
        match self {
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Install the global subscriber; `RUST_LOG` wins over `level` when set
///
/// Only the first call in a process installs a subscriber.
pub fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.level().to_string()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

/// Prologue hook: set up debug logging and log the model
pub fn prologue_handler(model: &dyn Model) -> anyhow::Result<()> {
    init_logging(LogLevel::Debug);
    info!("Running with {model:?}");
    Ok(())
}

/// Epilogue hook: log the exit code and run time
pub fn epilogue_handler(exit_code: i32, elapsed: Duration) {
    info!(
        "Completed running with exit code {exit_code} in {:.3} sec",
        elapsed.as_secs_f64()
    );
}
