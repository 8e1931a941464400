//! Error types for `dropdesk`.
//!
//! Every fallible library operation returns [`Result`]. The CLI turns a
//! [`DeskError`] into either a human message on stderr or, in `--json` mode,
//! a [`StructuredError`] envelope on stdout.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DeskError>;

/// All errors surfaced by the storage, snapshot and CLI layers.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("No .dropdesk directory found (run `dropdesk init` first)")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("{store} record not found: {key}")]
    NotFound { store: &'static str, key: String },

    #[error("{store} record already exists: {key}")]
    DuplicateKey { store: &'static str, key: String },

    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    #[error("Store {store} has no secondary index")]
    NoIndex { store: &'static str },

    #[error("Database schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: i32, supported: i32 },

    #[error("Could not generate a unique id for {store} after {attempts} attempts")]
    IdExhausted { store: &'static str, attempts: usize },

    #[error("Database handle poisoned by a panicked writer")]
    Poisoned,

    #[error("{0}")]
    Config(String),
}

impl DeskError {
    /// Shorthand for a validation failure.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a snapshot rejection.
    pub fn invalid_snapshot(reason: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            reason: reason.into(),
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Database(_) | Self::Poisoned => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::Yaml(_) => ErrorCode::ParseError,
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::DuplicateKey { .. } => ErrorCode::DuplicateKey,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::InvalidSnapshot { .. } => ErrorCode::InvalidSnapshot,
            Self::NoIndex { .. } | Self::IdExhausted { .. } => ErrorCode::InternalError,
            Self::SchemaTooNew { .. } => ErrorCode::SchemaTooNew,
            Self::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Optional remediation hint shown to the user.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `dropdesk init` in your working directory"),
            Self::SchemaTooNew { .. } => Some("Upgrade dropdesk to open this database"),
            Self::InvalidSnapshot { .. } => {
                Some("Snapshots must come from `dropdesk export` and carry version and exportDate")
            }
            Self::DuplicateKey { .. } => Some("Use the `edit` subcommand to change an existing record"),
            _ => None,
        }
    }

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } | Self::DuplicateKey { .. } | Self::InvalidSnapshot { .. } => 2,
            Self::NotFound { .. } => 3,
            _ => 1,
        }
    }
}

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    DatabaseError,
    IoError,
    ParseError,
    NotInitialized,
    AlreadyInitialized,
    NotFound,
    DuplicateKey,
    ValidationFailed,
    InvalidSnapshot,
    SchemaTooNew,
    ConfigError,
    InternalError,
}

/// JSON envelope for errors printed in `--json` mode.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    pub hint: Option<String>,
}

impl From<&DeskError> for StructuredError {
    fn from(err: &DeskError) -> Self {
        Self {
            error: ErrorBody {
                code: err.code(),
                message: err.to_string(),
                hint: err.hint().map(str::to_string),
            },
        }
    }
}
