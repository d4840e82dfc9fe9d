//! # Error Types
//!
//! Every failure in the library flows through [`TideError`]. The variants split into
//! two groups:
//!
//! - **Caller errors**: [`TideError::Parse`], [`TideError::CoordinateParse`],
//!   [`TideError::Configuration`] and [`TideError::UnknownLocation`] go straight back
//!   to whoever called the operation.
//! - **Engine errors**: [`TideError::StationNotFound`] and [`TideError::ProcessFailure`]
//!   carry a human-readable diagnostic. A session shows that text in place of the
//!   content it expected and stays usable.

use thiserror::Error;

/// Errors that can occur while talking to the engine or interpreting its output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TideError {
    /// The directory listing contained no station lines at all
    #[error("no station lines found in engine listing")]
    Parse,

    /// A distance sort met a line without coordinates
    #[error("no coordinates on line: {line}")]
    CoordinateParse { line: String },

    /// The engine exited cleanly but wrote nothing to standard output
    #[error("{diagnostics}")]
    StationNotFound { diagnostics: String },

    /// The engine exited with an error, was killed, or could not be started
    #[error("{diagnostics}")]
    ProcessFailure { diagnostics: String },

    /// No station was given and none is configured
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A station name that is not in the directory
    #[error("unknown location: {0}")]
    UnknownLocation(String),
}
