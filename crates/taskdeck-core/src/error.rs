//! Error types shared by every Taskdeck crate.
//!
//! Repository and store failures are reported through [`TodoError`]. The
//! calling layer is expected to turn them into user-facing notifications;
//! nothing in the workspace retries automatically.

use std::fmt;

use thiserror::Error;

/// Result type for Taskdeck operations
pub type TodoResult<T> = Result<T, TodoError>;

/// Record collections known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionName {
    Tasks,
    Categories,
}

impl CollectionName {
    /// Table name used by the embedded store.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionName::Tasks => "tasks",
            CollectionName::Categories => "categories",
        }
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while reading or writing tasks and categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    /// The store could not be opened, or it is closed.
    #[error("Storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    /// No record with the given identifier exists.
    #[error("No record '{id}' in {collection}")]
    NotFound {
        collection: CollectionName,
        id: String,
    },

    /// A required field was empty, a name collided, or similar.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// An open store failed while running an operation. The operation was rolled back.
    #[error("Storage operation '{operation}' failed: {details}")]
    Storage { operation: String, details: String },

    /// A stored record could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Reasons an argument is rejected before anything reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    #[error("task text cannot be empty")]
    EmptyText,

    #[error("task text is {len} characters (max {max})")]
    TextTooLong { len: usize, max: usize },

    #[error("category name cannot be empty")]
    EmptyName,

    #[error("a category named '{name}' already exists")]
    DuplicateName { name: String },

    #[error("a task with the text '{text}' already exists")]
    DuplicateText { text: String },

    #[error("identifier '{id}' is already in use")]
    DuplicateId { id: String },

    #[error("invalid identifier '{id}': {reason}")]
    InvalidId { id: String, reason: String },

    #[error("write attempted through a read-only collection handle")]
    ReadOnlyHandle,
}

impl TodoError {
    /// Shorthand for a [`TodoError::NotFound`].
    pub fn not_found(collection: CollectionName, id: impl Into<String>) -> Self {
        TodoError::NotFound {
            collection,
            id: id.into(),
        }
    }

    /// Shorthand for a [`TodoError::StorageUnavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        TodoError::StorageUnavailable {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`TodoError::Storage`].
    pub fn storage(operation: impl Into<String>, details: impl fmt::Display) -> Self {
        TodoError::Storage {
            operation: operation.into(),
            details: details.to_string(),
        }
    }

    /// Check if retrying the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TodoError::StorageUnavailable { .. } | TodoError::Storage { .. }
        )
    }

    /// Get the error code suitable for logging or reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            TodoError::StorageUnavailable { .. } => "STORAGE_UNAVAILABLE",
            TodoError::NotFound { .. } => "NOT_FOUND",
            TodoError::InvalidArgument(_) => "INVALID_ARGUMENT",
            TodoError::Storage { .. } => "STORAGE_ERROR",
            TodoError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for TodoError {
    fn from(err: serde_json::Error) -> Self {
        TodoError::Serialization(err.to_string())
    }
}
