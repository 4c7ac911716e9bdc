//! Collaborator seams driven by the dispatcher

use super::types::{FlowState, NodeRequest, Schedule, TaskFailure};
use async_trait::async_trait;
use serde_json::Value;

/// Task execution backend
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Execute one node and return its result
    async fn dispatch(&self, flow_name: &str, request: &NodeRequest) -> Result<Value, TaskFailure>;
}

/// Flow graph evaluator
///
/// Called once per tick with the flow's progress so far. Condition predicates
/// and edge evaluation live behind this trait.
pub trait FlowDriver: Send + Sync {
    fn schedule(&self, state: &FlowState) -> Schedule;
}
