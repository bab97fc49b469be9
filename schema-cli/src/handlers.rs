//! Built-in hooks
//!
//! Every hook is passed to the runner explicitly; these are the defaults it
//! starts with.

use std::io::Error as IoError;
use std::time::Duration;
use tracing::debug;

use crate::error::FailedExecution;
use crate::exit_codes::EXIT_ERROR;
use crate::model::Model;

/// Maps an error to a process exit code
pub type ExceptionHandler = Box<dyn Fn(&anyhow::Error) -> i32>;
/// Runs with the validated model before the handler
pub type PrologueHandler = Box<dyn Fn(&dyn Model) -> anyhow::Result<()>>;
/// Runs last with the final exit code and elapsed time
pub type EpilogueHandler = Box<dyn Fn(i32, Duration)>;

/// Exit code carried by the error, if it is (or wraps) a [`FailedExecution`]
pub fn failed_execution_code(err: &anyhow::Error) -> Option<i32> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<FailedExecution>())
        .map(|failed| failed.exit_code)
}

/// Print the error with its full cause chain (and backtrace, when captured)
pub fn default_exception_handler(err: &anyhow::Error) -> i32 {
    eprintln!("{err:?}");
    failed_execution_code(err).unwrap_or(EXIT_ERROR)
}

/// Print only the error message
pub fn default_minimal_exception_handler(err: &anyhow::Error) -> i32 {
    eprintln!("{err}");
    failed_execution_code(err).unwrap_or(EXIT_ERROR)
}

/// Like [`default_exception_handler`], preferring the OS error number of an underlying I/O error
pub fn os_error_exception_handler(err: &anyhow::Error) -> i32 {
    eprintln!("{err:?}");
    os_error_code(err)
        .or_else(|| failed_execution_code(err))
        .unwrap_or(EXIT_ERROR)
}

fn os_error_code(err: &anyhow::Error) -> Option<i32> {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<IoError>())
        .find_map(IoError::raw_os_error)
}

pub fn default_prologue_handler(_model: &dyn Model) -> anyhow::Result<()> {
    Ok(())
}

pub fn default_epilogue_handler(exit_code: i32, elapsed: Duration) {
    debug!(
        "completed in {:.2} sec with exit code {exit_code}",
        elapsed.as_secs_f64()
    );
}
