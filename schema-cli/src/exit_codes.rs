//! Process exit codes returned by the runner

/// Success, also used when an eager flag (help, version, completion) ends the run
pub const EXIT_SUCCESS: i32 = 0;
/// Default code for any error not carrying its own exit code
pub const EXIT_ERROR: i32 = 1;
