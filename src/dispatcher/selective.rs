//! Selective run: deciding per node whether the task really has to execute

use serde_json::{Map, Value};

/// Outcome of a selective run check
#[derive(Debug, Clone, PartialEq)]
pub enum RunDecision {
    /// Execute the task, merging the given entries into object node arguments
    Run(Map<String, Value>),
    /// Skip execution and reuse the result stored under the node's task id
    Reuse,
}

impl RunDecision {
    pub fn run() -> Self {
        Self::Run(Map::new())
    }

    /// Node arguments with overrides applied
    pub(crate) fn apply(overrides: &Map<String, Value>, node_args: &Value) -> Value {
        match node_args {
            Value::Object(args) if !overrides.is_empty() => {
                let mut merged = args.clone();
                merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
                Value::Object(merged)
            }
            _ => node_args.clone(),
        }
    }
}

pub trait SelectiveRun: Send + Sync {
    fn decide(&self, flow_name: &str, task_name: &str, node_args: &Value) -> RunDecision;
}

impl<F> SelectiveRun for F
where
    F: Fn(&str, &str, &Value) -> RunDecision + Send + Sync,
{
    fn decide(&self, flow_name: &str, task_name: &str, node_args: &Value) -> RunDecision {
        self(flow_name, task_name, node_args)
    }
}

/// Default routine: every node runs, nothing overridden
pub fn always_run(_flow_name: &str, _task_name: &str, _node_args: &Value) -> RunDecision {
    RunDecision::run()
}
