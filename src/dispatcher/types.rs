//! Value types exchanged between the dispatcher and its collaborators

use crate::cache::ResultKey;
use crate::error::{DispatchError, DispatchResult};
use crate::strategy::{NodeSnapshot, RetryStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// A node the flow driver wants started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRequest {
    /// Node name within the flow graph
    pub node_name: String,
    /// Task implementation executed for the node
    pub task_name: String,
    pub task_id: String,
    pub node_args: Value,
    /// Started as a fallback for failed nodes
    #[serde(default)]
    pub fallback: bool,
}

impl NodeRequest {
    /// Request for a node named after its task, with a fresh task id
    pub fn new(task_name: impl Into<String>, node_args: Value) -> Self {
        let task_name = task_name.into();
        Self {
            node_name: task_name.clone(),
            task_name,
            task_id: Uuid::new_v4().to_string(),
            node_args,
            fallback: false,
        }
    }

    pub fn with_node_name(mut self, node_name: impl Into<String>) -> Self {
        self.node_name = node_name.into();
        self
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = task_id.into();
        self
    }

    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    pub fn result_key(&self, flow_name: &str) -> ResultKey {
        ResultKey::new(flow_name, &self.task_name, &self.task_id)
    }
}

/// Failure reported by the task backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub reason: String,
    /// The flow driver may schedule the node again
    #[serde(default)]
    pub retryable: bool,
}

impl TaskFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            retryable: false,
        }
    }

    pub fn retryable(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            retryable: true,
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Where a completed node's result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Task executed through the queue
    Executed,
    /// Served by the result cache
    Cached,
    /// Selective run skipped execution; result fetched from cache or storage
    Reused,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Completed { result: Value, source: ResultSource },
    Failed(TaskFailure),
}

impl TaskOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// What the flow driver wants done on this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    pub nodes: Vec<NodeRequest>,
    /// Nodes still pending on conditions or parents
    pub waiting: Vec<String>,
    pub finished: bool,
}

impl Schedule {
    pub fn start(nodes: Vec<NodeRequest>) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }

    /// Nothing to start this tick
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn finished() -> Self {
        Self {
            finished: true,
            ..Self::default()
        }
    }

    pub fn with_waiting<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.waiting.extend(nodes.into_iter().map(Into::into));
        self
    }
}

/// Retry interval history of one flow instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    pub previous_retry: Option<Duration>,
}

impl RetryState {
    /// Ask `strategy` for the next interval and remember it
    pub fn advance(&mut self, strategy: &RetryStrategy, nodes: &NodeSnapshot) -> Duration {
        let next = strategy.next_retry(self.previous_retry, nodes);
        self.previous_retry = Some(next);
        next
    }
}

/// Progress of one running flow instance
#[derive(Debug, Clone)]
pub struct FlowState {
    flow_name: String,
    node_args: Value,
    results: HashMap<String, Value>,
    failures: HashMap<String, TaskFailure>,
    task_ids: HashMap<String, String>,
    retry: RetryState,
    ticks: u64,
}

impl FlowState {
    pub fn new(flow_name: impl Into<String>, node_args: Value) -> Self {
        Self {
            flow_name: flow_name.into(),
            node_args,
            results: HashMap::new(),
            failures: HashMap::new(),
            task_ids: HashMap::new(),
            retry: RetryState::default(),
            ticks: 0,
        }
    }

    pub fn flow_name(&self) -> &str {
        &self.flow_name
    }

    pub fn node_args(&self) -> &Value {
        &self.node_args
    }

    pub fn result(&self, node_name: &str) -> Option<&Value> {
        self.results.get(node_name)
    }

    pub fn is_completed(&self, node_name: &str) -> bool {
        self.results.contains_key(node_name)
    }

    pub fn failure(&self, node_name: &str) -> Option<&TaskFailure> {
        self.failures.get(node_name)
    }

    /// Task id the node last ran under
    pub fn task_id(&self, node_name: &str) -> Option<&str> {
        self.task_ids.get(node_name).map(String::as_str)
    }

    pub fn completed_count(&self) -> usize {
        self.results.len()
    }

    /// Failed node names, sorted
    pub fn failed_nodes(&self) -> Vec<String> {
        let mut nodes: Vec<_> = self.failures.keys().cloned().collect();
        nodes.sort_unstable();
        nodes
    }

    pub fn retry(&self) -> RetryState {
        self.retry
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub(crate) fn begin_tick(&mut self) {
        self.ticks += 1;
    }

    pub(crate) fn retry_mut(&mut self) -> &mut RetryState {
        &mut self.retry
    }

    pub(crate) fn record(&mut self, node: &NodeRequest, outcome: TaskOutcome) {
        self.task_ids
            .insert(node.node_name.clone(), node.task_id.clone());
        match outcome {
            TaskOutcome::Completed { result, .. } => {
                self.failures.remove(&node.node_name);
                self.results.insert(node.node_name.clone(), result);
            }
            TaskOutcome::Failed(failure) => {
                self.failures.insert(node.node_name.clone(), failure);
            }
        }
    }

    pub(crate) fn into_report(self) -> FlowReport {
        FlowReport {
            flow_name: self.flow_name,
            results: self.results,
            failures: self.failures,
            ticks: self.ticks,
        }
    }
}

/// Final state of a finished flow instance
#[derive(Debug, Clone, PartialEq)]
pub struct FlowReport {
    pub flow_name: String,
    pub results: HashMap<String, Value>,
    pub failures: HashMap<String, TaskFailure>,
    pub ticks: u64,
}

impl FlowReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Node results, or the first failure (by node name) as an error
    pub fn into_result(self) -> DispatchResult<HashMap<String, Value>> {
        let first_failure = self
            .failures
            .into_iter()
            .min_by(|(a, _), (b, _)| a.cmp(b));
        match first_failure {
            Some((node_name, failure)) => Err(DispatchError::task_failed(node_name, failure.reason)),
            None => Ok(self.results),
        }
    }
}
