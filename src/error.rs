//! Error types for schedule planning.
//!
//! Every error in this crate is a contract error (malformed options, bad
//! index, malformed catalog data). Nothing here is transient, so callers
//! should surface these rather than retry.

use thiserror::Error;

use crate::validation::ValidationError;

/// Main error type for planning operations.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A sort option names a metric that is not in the registry.
    #[error("Non-existent sorting option: {0}")]
    InvalidOption(String),

    /// A ranked index lies outside `[0, len)`.
    #[error("Index {index} out of range for {len} schedules")]
    IndexOutOfRange {
        /// Requested index.
        index: i64,
        /// Number of schedules held.
        len: usize,
    },

    /// A time block violates `0 <= start < end <= 1440` or failed to parse.
    #[error("Invalid time block: {0}")]
    InvalidTimeBlock(String),

    /// A selection references a course key missing from the catalog.
    #[error("Unknown course: {0}")]
    UnknownCourse(String),

    /// Input failed structural validation.
    #[error("Invalid input: {} problem(s), first: {}", .0.len(), first_message(.0))]
    Validation(Vec<ValidationError>),

    /// Generation was cancelled through its [`CancelToken`](crate::generator::CancelToken).
    #[error("Schedule generation was cancelled")]
    Cancelled,

    /// The background worker could not start or panicked.
    #[error("Worker failed: {0}")]
    Worker(String),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for planning operations.
pub type Result<T> = std::result::Result<T, PlannerError>;

fn first_message(errors: &[ValidationError]) -> &str {
    errors.first().map_or("", |e| e.message.as_str())
}
