//! Storage adapter error types

use thiserror::Error;

/// Errors raised by [`DataStorage`](super::DataStorage) adapters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Adapter used while not connected, or the backend cannot be reached
    #[error("Storage '{adapter}' unavailable: {reason}")]
    Unavailable { adapter: String, reason: String },

    /// No record for the requested task id
    #[error("No record found for task '{task_name}' with id '{task_id}'")]
    NotFound { task_name: String, task_id: String },

    /// More than one record shares the requested task id
    #[error("{count} records found for task id '{task_id}'")]
    Ambiguous { task_id: String, count: usize },

    /// The record stored under the task id belongs to another task
    #[error("Record '{task_id}' belongs to task '{found}', expected '{expected}'")]
    TaskNameMismatch {
        task_id: String,
        expected: String,
        found: String,
    },

    /// Operation not provided by this adapter
    #[error("Storage '{adapter}' does not support {operation}")]
    Unsupported {
        adapter: String,
        operation: &'static str,
    },
}

impl StorageError {
    pub fn unavailable<A: Into<String>, R: std::fmt::Display>(adapter: A, reason: R) -> Self {
        Self::Unavailable {
            adapter: adapter.into(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found<T: Into<String>, I: Into<String>>(task_name: T, task_id: I) -> Self {
        Self::NotFound {
            task_name: task_name.into(),
            task_id: task_id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
