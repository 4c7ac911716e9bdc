//! Node outcome sets observed by the dispatcher on one tick

use serde::{Deserialize, Serialize};

/// Read-only snapshot of node outcomes passed to a retry strategy
///
/// `started` and `fallback_started` hold the nodes started during the current
/// tick; `active` and `failed` describe the flow as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub active: Vec<String>,
    pub failed: Vec<String>,
    pub started: Vec<String>,
    pub fallback_started: Vec<String>,
}

impl NodeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn with_failed<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failed.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn with_started<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.started.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn with_fallback_started<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback_started
            .extend(nodes.into_iter().map(Into::into));
        self
    }

    /// At least one node (primary or fallback) started this tick
    pub fn has_progress(&self) -> bool {
        !self.started.is_empty() || !self.fallback_started.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_detection() {
        assert!(!NodeSnapshot::new().has_progress());
        assert!(!NodeSnapshot::new()
            .with_active(["Task1"])
            .with_failed(["Task2"])
            .has_progress());
        assert!(NodeSnapshot::new().with_started(["Task1"]).has_progress());
        assert!(NodeSnapshot::new()
            .with_fallback_started(["Fallback1"])
            .has_progress());
    }
}
