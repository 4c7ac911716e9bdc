use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use taskflow_core::dispatcher::{
    DispatcherTracer, FlowDriver, FlowState, NodeRequest, Schedule, TaskFailure, TaskQueue,
    TraceEvent,
};

/// Task queue returning scripted outcomes per task name
///
/// Unscripted tasks succeed with `{"task": <task_name>, "args": <node_args>}`.
#[derive(Debug, Default)]
pub struct MockTaskQueue {
    scripted: Mutex<HashMap<String, VecDeque<Result<Value, TaskFailure>>>>,
    calls: Mutex<Vec<NodeRequest>>,
}

impl MockTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(self, task_name: &str, result: Value) -> Self {
        self.push(task_name, Ok(result));
        self
    }

    pub fn with_failure(self, task_name: &str, failure: TaskFailure) -> Self {
        self.push(task_name, Err(failure));
        self
    }

    fn push(&self, task_name: &str, outcome: Result<Value, TaskFailure>) {
        self.scripted
            .lock()
            .entry(task_name.to_string())
            .or_default()
            .push_back(outcome);
    }

    pub fn calls(&self) -> Vec<NodeRequest> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, task_name: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.task_name == task_name)
            .count()
    }
}

#[async_trait]
impl TaskQueue for MockTaskQueue {
    async fn dispatch(&self, _flow_name: &str, request: &NodeRequest) -> Result<Value, TaskFailure> {
        self.calls.lock().push(request.clone());
        let scripted = self
            .scripted
            .lock()
            .get_mut(&request.task_name)
            .and_then(VecDeque::pop_front);
        tokio::task::yield_now().await;
        scripted.unwrap_or_else(|| Ok(json!({"task": request.task_name, "args": request.node_args})))
    }
}

/// Returns one prepared schedule per tick, then reports the flow finished
#[derive(Debug, Clone)]
pub struct ScriptedDriver {
    ticks: Vec<Schedule>,
}

impl ScriptedDriver {
    pub fn new(ticks: Vec<Schedule>) -> Self {
        Self { ticks }
    }
}

impl FlowDriver for ScriptedDriver {
    fn schedule(&self, state: &FlowState) -> Schedule {
        let index = (state.ticks() as usize).saturating_sub(1);
        self.ticks
            .get(index)
            .cloned()
            .unwrap_or_else(Schedule::finished)
    }
}

/// Runs tasks one after another, rescheduling retryable failures
///
/// Finishes once every task completed or a task failed for good.
#[derive(Debug, Clone)]
pub struct ChainDriver {
    tasks: Vec<String>,
}

impl ChainDriver {
    pub fn new(tasks: &[&str]) -> Self {
        Self {
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl FlowDriver for ChainDriver {
    fn schedule(&self, state: &FlowState) -> Schedule {
        if self
            .tasks
            .iter()
            .any(|task| state.failure(task).is_some_and(|f| !f.retryable))
        {
            return Schedule::finished();
        }

        match self.tasks.iter().find(|task| !state.is_completed(task)) {
            Some(task) => {
                let waiting: Vec<String> = self
                    .tasks
                    .iter()
                    .filter(|t| *t != task && !state.is_completed(t))
                    .cloned()
                    .collect();
                Schedule::start(vec![NodeRequest::new(task.clone(), state.node_args().clone())])
                    .with_waiting(waiting)
            }
            None => Schedule::finished(),
        }
    }
}

/// Never finishes and never starts anything
#[derive(Debug, Clone, Copy)]
pub struct StalledDriver;

impl FlowDriver for StalledDriver {
    fn schedule(&self, _state: &FlowState) -> Schedule {
        Schedule::idle().with_waiting(["Task1"])
    }
}

/// Collects every trace event
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingTracer {
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(TraceEvent::name).collect()
    }
}

impl DispatcherTracer for RecordingTracer {
    fn trace(&self, event: &TraceEvent) {
        self.events.lock().push(event.clone());
    }
}
