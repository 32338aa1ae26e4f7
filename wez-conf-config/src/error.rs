//! Typed error variants for the wez-conf-config crate.
//!
//! Provides structured error types for state-record I/O. These are used
//! internally and exposed for library consumers who want to match on
//! specific failure modes instead of opaque `anyhow` strings.

use std::fmt;

/// Errors that can occur when reading or writing persisted state records.
///
/// The store itself treats persistence failures as non-fatal (it logs and
/// continues, since the worst case is state that does not survive a
/// restart), but the record functions surface these so callers that do care
/// can match on the failure mode.
#[derive(Debug)]
pub enum StateError {
    /// An I/O error occurred reading or writing a state record.
    Io(std::io::Error),

    /// A state record contained invalid YAML that could not be parsed.
    Parse(serde_yaml_ng::Error),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Io(e) => write!(f, "I/O error accessing state record: {e}"),
            StateError::Parse(e) => write!(f, "YAML parse error in state record: {e}"),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Io(e) => Some(e),
            StateError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StateError {
    fn from(e: std::io::Error) -> Self {
        StateError::Io(e)
    }
}

impl From<serde_yaml_ng::Error> for StateError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        StateError::Parse(e)
    }
}
