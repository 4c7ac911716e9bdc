//! # Structured Logging Module
//!
//! Environment-aware structured logging for the dispatcher. The filter comes
//! from `RUST_LOG` when set, otherwise from the detected environment, and
//! `TASKFLOW_LOG_FORMAT=json` switches the console output to JSON lines.

use crate::config::loader::detect_environment;
use crate::strategy::NodeSnapshot;
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

const LOG_FORMAT_ENV: &str = "TASKFLOW_LOG_FORMAT";

/// Initialize structured logging with environment-specific configuration
///
/// Safe to call more than once; an already installed global subscriber is kept.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = detect_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level_for(&environment)));
        let json = std::env::var(LOG_FORMAT_ENV)
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let console = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(filter)
                .boxed()
        };

        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            json,
            "STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Default filter directive for an environment
fn log_level_for(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log structured data for a cache operation
pub fn log_cache_operation(operation: &str, key: &str, policy: &str, hit: Option<bool>) {
    tracing::debug!(
        operation = %operation,
        key = %key,
        policy = %policy,
        hit = hit,
        "🗄️ CACHE_OPERATION"
    );
}

/// Whole milliseconds of `duration` as a log field, saturating at `u64::MAX`
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Log structured data for a retry scheduling decision
pub fn log_retry_decision(
    flow_name: &str,
    strategy: &str,
    previous: Option<Duration>,
    next: Duration,
    nodes: &NodeSnapshot,
) {
    tracing::debug!(
        flow_name = %flow_name,
        strategy = %strategy,
        previous_ms = previous.map(duration_ms),
        next_ms = duration_ms(next),
        progress = nodes.has_progress(),
        started = nodes.started.len(),
        fallback_started = nodes.fallback_started.len(),
        failed = nodes.failed.len(),
        "⏱️ RETRY_DECISION"
    );
}
