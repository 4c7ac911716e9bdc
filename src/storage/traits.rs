//! Storage adapter trait

use super::errors::{StorageError, StorageResult};
use crate::dispatcher::TaskFailure;
use async_trait::async_trait;
use serde_json::Value;

/// Persistent store for task results
///
/// The dispatcher keeps a result cache in front of the adapter: a cache hit
/// avoids `retrieve` entirely and a fresh result is written to both.
#[async_trait]
pub trait DataStorage: Send + Sync + std::fmt::Debug {
    /// Name of the adapter, used in logs and errors
    fn adapter_name(&self) -> &'static str;

    async fn connect(&self) -> StorageResult<()>;

    async fn disconnect(&self) -> StorageResult<()>;

    fn is_connected(&self) -> bool;

    /// Fetch the result stored for `task_id`
    ///
    /// Fails with [`StorageError::NotFound`] when nothing matches and
    /// [`StorageError::Ambiguous`] when several records do.
    async fn retrieve(&self, flow_name: &str, task_name: &str, task_id: &str)
        -> StorageResult<Value>;

    /// Persist a task result, returning the id it was stored under
    async fn store(
        &self,
        node_args: &Value,
        flow_name: &str,
        task_name: &str,
        task_id: &str,
        result: &Value,
    ) -> StorageResult<String>;

    /// Persist a task failure
    async fn store_error(
        &self,
        _node_args: &Value,
        _flow_name: &str,
        _task_name: &str,
        _task_id: &str,
        _failure: &TaskFailure,
    ) -> StorageResult<()> {
        Err(StorageError::Unsupported {
            adapter: self.adapter_name().to_string(),
            operation: "store_error",
        })
    }
}
