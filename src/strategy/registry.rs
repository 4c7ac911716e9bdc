//! Name-to-function registry for retry strategies
//!
//! Configuration names a strategy by string. The registry turns that name
//! into a typed [`RetryStrategy`] once, at startup, so an unknown name or a
//! bad argument never reaches the dispatch loop.

use super::{RetryStrategy, StrategyFn, StrategyKind, StrategyParams};
use crate::config::{ConfigResult, ConfigurationError, StrategyArgs, StrategyConfig};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<&'static str, (StrategyKind, StrategyFn)>,
}

impl StrategyRegistry {
    /// Registry populated with the five built-in strategies
    pub fn with_builtins() -> Self {
        let strategies = StrategyKind::ALL
            .into_iter()
            .map(|kind| (kind.as_str(), (kind, kind.function())))
            .collect();
        Self { strategies }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Registered names in alphabetical order
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.strategies.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn lookup(&self, name: &str) -> ConfigResult<(StrategyKind, StrategyFn)> {
        self.strategies
            .get(name)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownStrategy {
                name: name.to_string(),
            })
    }

    /// Resolve a configured strategy into a callable [`RetryStrategy`]
    pub fn resolve(&self, config: &StrategyConfig) -> ConfigResult<RetryStrategy> {
        let (kind, function) = self.lookup(config.name.trim())?;
        let params = build_params(&config.args)?;
        kind.check_params(&params)?;
        if let Some(step) = unused_step(kind, &config.args) {
            warn!(
                strategy = %kind,
                step,
                "strategy.args.step is ignored by this strategy"
            );
        }

        debug!(
            strategy = %kind,
            start = ?params.start(),
            max = ?params.max(),
            step = ?params.has_step().then(|| params.step()),
            "Resolved retry strategy"
        );

        Ok(RetryStrategy::from_parts(kind, params, function))
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn build_params(args: &StrategyArgs) -> ConfigResult<StrategyParams> {
    let start = StrategyArgs::seconds("start_retry", args.start_retry)?;
    let max = StrategyArgs::seconds("max_retry", args.max_retry)?;
    let params = StrategyParams::new(start, max)?;

    match args.step {
        Some(step) => params.with_step(StrategyArgs::seconds("step", step)?),
        None => Ok(params),
    }
}

/// Configured step that `kind` never reads
fn unused_step(kind: StrategyKind, args: &StrategyArgs) -> Option<f64> {
    args.step.filter(|_| !kind.requires_step())
}
