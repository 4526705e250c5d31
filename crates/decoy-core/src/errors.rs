//! Error types for call construction and argument lookup.

use thiserror::Error;

/// Errors that can occur when building or querying call values.
#[derive(Debug, Error)]
pub enum CallError {
    /// Argument values and names have different lengths.
    #[error("argument collection has {values} value(s) but {names} name(s)")]
    MismatchedNames {
        /// Number of argument values supplied.
        values: usize,
        /// Number of argument names supplied.
        names: usize,
    },

    /// No argument with the requested name exists.
    #[error("no argument named `{name}` (available: {available})")]
    UnknownArgument {
        /// The requested argument name.
        name: String,
        /// Comma-separated list of the names that do exist.
        available: String,
    },
}

/// Result type for call-value operations.
pub type Result<T> = std::result::Result<T, CallError>;
