//! Crate-level error type for dispatcher operations

use crate::cache::CacheError;
use crate::config::ConfigurationError;
use crate::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Task '{task_name}' failed: {reason}")]
    TaskFailed { task_name: String, reason: String },

    #[error("Dispatcher shut down before flow '{flow_name}' finished")]
    Shutdown { flow_name: String },
}

impl DispatchError {
    pub fn task_failed<T: Into<String>, R: Into<String>>(task_name: T, reason: R) -> Self {
        Self::TaskFailed {
            task_name: task_name.into(),
            reason: reason.into(),
        }
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown { .. })
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
