// crates/inspect/src/error.rs

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Exit status used for every failure the probe reports itself.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Every way a run of the probe can fail. Each variant renders as the single
/// diagnostic line written to stderr before the process exits.
#[derive(Debug, Error)]
pub enum InspectError {
    /// Positional arguments were left over after flag parsing.
    #[error("Wrong parameters")]
    WrongParameters,

    #[error("Cannot write to file {path:?}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read file {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot get working directory: {0}")]
    WorkingDirectory(#[source] io::Error),

    #[error("Working directory: {actual:?}. Expected: {expected:?}.")]
    WorkingDirectoryMismatch { actual: PathBuf, expected: OsString },

    /// Stdout went away (closed pipe, full disk) while printing.
    #[error("Cannot write to standard output: {0}")]
    Output(#[source] io::Error),
}

impl InspectError {
    /// The process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            InspectError::WrongParameters
            | InspectError::WriteFile { .. }
            | InspectError::ReadFile { .. }
            | InspectError::WorkingDirectory(_)
            | InspectError::WorkingDirectoryMismatch { .. }
            | InspectError::Output(_) => FAILURE_EXIT_CODE,
        }
    }
}
