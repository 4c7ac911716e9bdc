//! In-process storage adapter
//!
//! Behaves like a document collection: `store` appends a record, so storing
//! the same task id twice leaves two records and a later `retrieve` reports
//! the ambiguity instead of guessing.

use super::errors::{StorageError, StorageResult};
use super::traits::DataStorage;
use crate::dispatcher::TaskFailure;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};
use uuid::Uuid;

const ADAPTER_NAME: &str = "in_memory";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub record_id: Uuid,
    pub flow_name: String,
    pub task_name: String,
    pub task_id: String,
    pub node_args: Value,
    pub result: Value,
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub record_id: Uuid,
    pub flow_name: String,
    pub task_name: String,
    pub task_id: String,
    pub node_args: Value,
    pub failure: TaskFailure,
    pub failed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct InMemoryStorage {
    connected: AtomicBool,
    records: RwLock<Vec<StoredRecord>>,
    errors: RwLock<Vec<ErrorRecord>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Already-connected adapter, convenient for tests
    pub fn connected() -> Self {
        let storage = Self::new();
        storage.connected.store(true, Ordering::SeqCst);
        storage
    }

    pub fn records(&self) -> Vec<StoredRecord> {
        self.records.read().clone()
    }

    pub fn error_records(&self) -> Vec<ErrorRecord> {
        self.errors.read().clone()
    }

    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }

    fn ensure_connected(&self) -> StorageResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(StorageError::unavailable(ADAPTER_NAME, "not connected"))
        }
    }
}

#[async_trait]
impl DataStorage for InMemoryStorage {
    fn adapter_name(&self) -> &'static str {
        ADAPTER_NAME
    }

    async fn connect(&self) -> StorageResult<()> {
        if !self.connected.swap(true, Ordering::SeqCst) {
            info!(adapter = ADAPTER_NAME, "Storage connected");
        }
        Ok(())
    }

    async fn disconnect(&self) -> StorageResult<()> {
        if self.connected.swap(false, Ordering::SeqCst) {
            info!(adapter = ADAPTER_NAME, "Storage disconnected");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn retrieve(
        &self,
        _flow_name: &str,
        task_name: &str,
        task_id: &str,
    ) -> StorageResult<Value> {
        self.ensure_connected()?;

        let records = self.records.read();
        let mut matches = records.iter().filter(|r| r.task_id == task_id);
        let record = match (matches.next(), matches.count()) {
            (None, _) => return Err(StorageError::not_found(task_name, task_id)),
            (Some(record), 0) => record,
            (Some(_), rest) => {
                return Err(StorageError::Ambiguous {
                    task_id: task_id.to_string(),
                    count: rest + 1,
                })
            }
        };

        if record.task_name != task_name {
            return Err(StorageError::TaskNameMismatch {
                task_id: task_id.to_string(),
                expected: task_name.to_string(),
                found: record.task_name.clone(),
            });
        }

        Ok(record.result.clone())
    }

    async fn store(
        &self,
        node_args: &Value,
        flow_name: &str,
        task_name: &str,
        task_id: &str,
        result: &Value,
    ) -> StorageResult<String> {
        self.ensure_connected()?;

        let record = StoredRecord {
            record_id: Uuid::new_v4(),
            flow_name: flow_name.to_string(),
            task_name: task_name.to_string(),
            task_id: task_id.to_string(),
            node_args: node_args.clone(),
            result: result.clone(),
            stored_at: Utc::now(),
        };
        debug!(
            flow_name,
            task_name,
            task_id,
            record_id = %record.record_id,
            "Stored task result"
        );
        self.records.write().push(record);

        Ok(task_id.to_string())
    }

    async fn store_error(
        &self,
        node_args: &Value,
        flow_name: &str,
        task_name: &str,
        task_id: &str,
        failure: &TaskFailure,
    ) -> StorageResult<()> {
        self.ensure_connected()?;

        self.errors.write().push(ErrorRecord {
            record_id: Uuid::new_v4(),
            flow_name: flow_name.to_string(),
            task_name: task_name.to_string(),
            task_id: task_id.to_string(),
            node_args: node_args.clone(),
            failure: failure.clone(),
            failed_at: Utc::now(),
        });
        debug!(flow_name, task_name, task_id, reason = %failure.reason, "Stored task failure");

        Ok(())
    }
}
