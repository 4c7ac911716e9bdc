//! # Retry Scheduling Strategies
//!
//! A strategy decides how long the dispatcher waits before re-examining a
//! flow. It is a pure function of its parameters, the interval it returned
//! last time and the node outcomes of the current tick:
//!
//! | Strategy                  | progress        | no progress      |
//! |---------------------------|-----------------|------------------|
//! | `linear_increase`         | `prev + step`   | `start`          |
//! | `linear_adopt`            | `prev + step`   | `prev - step`    |
//! | `biexponential_increase`  | `prev * 2`      | `start`          |
//! | `biexponential_adopt`     | `prev * 2`      | `prev / 2`       |
//! | `random`                  | uniform in `[start, max]` (whole ms) |
//!
//! Results are clamped to `[start, max]` and the first call for a flow
//! (no previous interval) returns `start`.
//!
//! ```rust
//! use std::time::Duration;
//! use taskflow_core::strategy::{NodeSnapshot, RetryStrategy, StrategyKind, StrategyParams};
//!
//! let params = StrategyParams::new(Duration::from_secs(2), Duration::from_secs(10))
//!     .unwrap()
//!     .with_step(Duration::from_secs(3))
//!     .unwrap();
//! let strategy = RetryStrategy::new(StrategyKind::LinearIncrease, params).unwrap();
//!
//! let progress = NodeSnapshot::new().with_started(["Task1"]);
//! let first = strategy.next_retry(None, &progress);
//! assert_eq!(first, Duration::from_secs(2));
//! assert_eq!(strategy.next_retry(Some(first), &progress), Duration::from_secs(5));
//! ```

pub mod functions;
pub mod nodes;
pub mod registry;

use crate::config::{ConfigResult, ConfigurationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub use functions::StrategyFn;
pub use nodes::NodeSnapshot;
pub use registry::StrategyRegistry;

/// Validated strategy parameters
///
/// `start <= max` always holds and `step`, when present, is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyParams {
    start: Duration,
    max: Duration,
    step: Option<Duration>,
}

impl StrategyParams {
    pub fn new(start: Duration, max: Duration) -> ConfigResult<Self> {
        if start > max {
            return Err(ConfigurationError::invalid_value(
                "strategy.args.start_retry",
                format!("{start:?}"),
                format!("start_retry must not exceed max_retry ({max:?})"),
            ));
        }
        Ok(Self {
            start,
            max,
            step: None,
        })
    }

    pub fn with_step(mut self, step: Duration) -> ConfigResult<Self> {
        if step.is_zero() {
            return Err(ConfigurationError::invalid_value(
                "strategy.args.step",
                "0",
                "step must be positive",
            ));
        }
        self.step = Some(step);
        Ok(self)
    }

    pub fn start(&self) -> Duration {
        self.start
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Linear step, zero when none was configured
    pub fn step(&self) -> Duration {
        self.step.unwrap_or(Duration::ZERO)
    }

    pub fn has_step(&self) -> bool {
        self.step.is_some()
    }

    /// Bound `value` to `[start, max]`
    pub fn clamp(&self, value: Duration) -> Duration {
        value.max(self.start).min(self.max)
    }
}

/// Closed set of built-in strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    LinearIncrease,
    LinearAdopt,
    BiexponentialIncrease,
    BiexponentialAdopt,
    Random,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        Self::LinearIncrease,
        Self::LinearAdopt,
        Self::BiexponentialIncrease,
        Self::BiexponentialAdopt,
        Self::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinearIncrease => "linear_increase",
            Self::LinearAdopt => "linear_adopt",
            Self::BiexponentialIncrease => "biexponential_increase",
            Self::BiexponentialAdopt => "biexponential_adopt",
            Self::Random => "random",
        }
    }

    pub fn function(&self) -> StrategyFn {
        match self {
            Self::LinearIncrease => functions::linear_increase,
            Self::LinearAdopt => functions::linear_adopt,
            Self::BiexponentialIncrease => functions::biexponential_increase,
            Self::BiexponentialAdopt => functions::biexponential_adopt,
            Self::Random => functions::random,
        }
    }

    pub fn requires_step(&self) -> bool {
        matches!(self, Self::LinearIncrease | Self::LinearAdopt)
    }

    /// Doubling from zero never grows, so these need a positive start
    pub fn requires_positive_start(&self) -> bool {
        matches!(self, Self::BiexponentialIncrease | Self::BiexponentialAdopt)
    }

    /// Check the kind-specific parameter requirements
    pub fn check_params(&self, params: &StrategyParams) -> ConfigResult<()> {
        if self.requires_step() && !params.has_step() {
            return Err(ConfigurationError::missing_required_field(
                "strategy.args.step",
                format!("strategy '{self}'"),
            ));
        }
        if self.requires_positive_start() && params.start().is_zero() {
            return Err(ConfigurationError::invalid_value(
                "strategy.args.start_retry",
                "0",
                format!("strategy '{self}' requires a positive start_retry"),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| ConfigurationError::UnknownStrategy {
                name: s.to_string(),
            })
    }
}

/// A resolved, ready-to-call retry strategy
#[derive(Clone, Copy)]
pub struct RetryStrategy {
    kind: StrategyKind,
    params: StrategyParams,
    function: StrategyFn,
}

impl RetryStrategy {
    pub fn new(kind: StrategyKind, params: StrategyParams) -> ConfigResult<Self> {
        kind.check_params(&params)?;
        Ok(Self::from_parts(kind, params, kind.function()))
    }

    pub(crate) fn from_parts(kind: StrategyKind, params: StrategyParams, function: StrategyFn) -> Self {
        Self {
            kind,
            params,
            function,
        }
    }

    /// Next retry interval given the previous one and this tick's outcomes
    pub fn next_retry(&self, previous_retry: Option<Duration>, nodes: &NodeSnapshot) -> Duration {
        (self.function)(&self.params, previous_retry, nodes)
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }
}

impl fmt::Debug for RetryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryStrategy")
            .field("kind", &self.kind)
            .field("params", &self.params)
            .finish()
    }
}
