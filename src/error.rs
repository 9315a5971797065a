//! Error types for the sales store and workflows.

use thiserror::Error;

/// Result type for store and workflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sales-kit.
///
/// Every store and workflow operation returns `Result<T>`. The variants split
/// into two groups:
///
/// - **Request errors** (`NotFound`, `Validation`): caused by the caller's
///   input. The HTTP layer answers them with 404 and 422 respectively.
/// - **Infrastructure errors** (everything else): the store, the snapshot
///   file or the configuration is broken. These surface as 500s.
///
/// There is no conflict variant. Removing a customer or product that is still
/// referenced downgrades to a soft delete instead of failing.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A directly addressed record does not exist.
    ///
    /// `entity` is the table name (`"customer"`, `"product"`, `"sale"`, ...).
    #[error("{entity} {id} not found")]
    NotFound {
        /// Table the lookup ran against
        entity: &'static str,
        /// Requested id
        id: i64,
    },

    /// User input was rejected.
    ///
    /// Raised for unparseable or non-positive quantities, insufficient stock,
    /// duplicate emails and malformed form fields. The message is meant to be
    /// shown to the user as-is.
    #[error("{0}")]
    Validation(String),

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Snapshot encoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Snapshot payload could not be decoded.
    ///
    /// **Recovery:** move the snapshot file aside and restart with an empty
    /// store.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The snapshot file does not start with the sales-kit magic header.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// The snapshot was written by an incompatible schema version.
    #[error("Snapshot version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from the snapshot file)
        found: u32,
    },

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Error::NotFound { entity, id }
    }

    /// Shorthand for [`Error::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// True for errors caused by the caller's input rather than the system.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::Validation(_))
    }
}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::Storage(e.to_string())
        } else if e.is_syntax() || e.is_data() || e.is_eof() {
            Error::Deserialization(e.to_string())
        } else {
            Error::Serialization(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<postcard::Error> for Error {
    fn from(e: postcard::Error) -> Self {
        Error::Deserialization(e.to_string())
    }
}
