//! Run reporting and exit status used by the binary and by `run_sync`.

pub mod exit_code;
pub mod github_output;
pub mod statistics;

pub use exit_code::{exit_code, EXIT_FAILURE, EXIT_SUCCESS};
pub use github_output::write_github_output;
pub use statistics::{print_diagnostics, print_run_summary};
