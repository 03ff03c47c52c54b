//! Process exit status for a finished run.

use crate::error_handling::SyncError;
use crate::run::RunOutcome;

/// Published and skipped runs.
pub const EXIT_SUCCESS: i32 = 0;

/// Any run that ended in the `Failed` state.
pub const EXIT_FAILURE: i32 = 1;

/// Maps a run result to the status the binary exits with.
///
/// A skipped run is a success: nothing changed, so the scheduler has nothing
/// to commit and nothing to alert on.
pub fn exit_code(result: &Result<RunOutcome, SyncError>) -> i32 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(_) => EXIT_FAILURE,
    }
}
