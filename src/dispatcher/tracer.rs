//! Dispatcher tracing hook
//!
//! Every notable dispatcher action is reported as a [`TraceEvent`]. With
//! `trace.enabled` set the events go to [`LoggingTracer`]; embedders can plug
//! any [`DispatcherTracer`] (closures included) with
//! [`Dispatcher::with_tracer`](super::Dispatcher::with_tracer).

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    FlowStarted {
        flow_name: String,
    },
    TaskScheduled {
        flow_name: String,
        task_name: String,
        task_id: String,
        fallback: bool,
    },
    CacheHit {
        flow_name: String,
        task_name: String,
        task_id: String,
    },
    CacheMiss {
        flow_name: String,
        task_name: String,
        task_id: String,
    },
    TaskCompleted {
        flow_name: String,
        task_name: String,
        task_id: String,
    },
    TaskFailed {
        flow_name: String,
        task_name: String,
        task_id: String,
        reason: String,
    },
    ResultReused {
        flow_name: String,
        task_name: String,
        task_id: String,
    },
    RetryScheduled {
        flow_name: String,
        #[serde(with = "duration_millis")]
        retry: Duration,
        progress: bool,
    },
    FlowFinished {
        flow_name: String,
        ticks: u64,
    },
    FlowInterrupted {
        flow_name: String,
    },
}

impl TraceEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FlowStarted { .. } => "flow_started",
            Self::TaskScheduled { .. } => "task_scheduled",
            Self::CacheHit { .. } => "cache_hit",
            Self::CacheMiss { .. } => "cache_miss",
            Self::TaskCompleted { .. } => "task_completed",
            Self::TaskFailed { .. } => "task_failed",
            Self::ResultReused { .. } => "result_reused",
            Self::RetryScheduled { .. } => "retry_scheduled",
            Self::FlowFinished { .. } => "flow_finished",
            Self::FlowInterrupted { .. } => "flow_interrupted",
        }
    }
}

mod duration_millis {
    use crate::logging::duration_ms;
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration_ms(*value))
    }
}

/// Receiver of dispatcher trace events
pub trait DispatcherTracer: Send + Sync {
    fn trace(&self, event: &TraceEvent);
}

impl<F> DispatcherTracer for F
where
    F: Fn(&TraceEvent) + Send + Sync,
{
    fn trace(&self, event: &TraceEvent) {
        self(event)
    }
}

/// Forwards trace events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTracer;

impl DispatcherTracer for LoggingTracer {
    fn trace(&self, event: &TraceEvent) {
        match event {
            TraceEvent::TaskFailed {
                flow_name,
                task_name,
                task_id,
                reason,
            } => error!(
                event = event.name(),
                flow_name = %flow_name,
                task_name = %task_name,
                task_id = %task_id,
                reason = %reason,
                "TRACE"
            ),
            TraceEvent::FlowStarted { flow_name } | TraceEvent::FlowInterrupted { flow_name } => {
                info!(event = event.name(), flow_name = %flow_name, "TRACE")
            }
            TraceEvent::FlowFinished { flow_name, ticks } => {
                info!(event = event.name(), flow_name = %flow_name, ticks, "TRACE")
            }
            other => match serde_json::to_string(other) {
                Ok(details) => debug!(event = other.name(), details = %details, "TRACE"),
                Err(_) => debug!(event = other.name(), "TRACE"),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl DispatcherTracer for NoopTracer {
    fn trace(&self, _event: &TraceEvent) {}
}
