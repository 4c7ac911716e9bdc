//! Retry interval sequences produced by the built-in strategies

use serde_json::json;
use std::time::Duration;
use taskflow_core::config::{ConfigurationError, DispatcherConfig};
use taskflow_core::strategy::{NodeSnapshot, RetryStrategy, StrategyKind, StrategyParams, StrategyRegistry};

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn strategy(kind: StrategyKind, start: u64, max: u64, step: Option<u64>) -> RetryStrategy {
    let mut params = StrategyParams::new(secs(start), secs(max)).unwrap();
    if let Some(step) = step {
        params = params.with_step(secs(step)).unwrap();
    }
    RetryStrategy::new(kind, params).unwrap()
}

fn progress() -> NodeSnapshot {
    NodeSnapshot::new().with_started(["Task1"])
}

fn no_progress() -> NodeSnapshot {
    NodeSnapshot::new().with_active(["Task2"]).with_failed(["Task3"])
}

/// Feed the strategy its own output for `ticks` ticks
fn sequence(strategy: &RetryStrategy, nodes: &NodeSnapshot, ticks: usize) -> Vec<u64> {
    let mut previous = None;
    (0..ticks)
        .map(|_| {
            let next = strategy.next_retry(previous, nodes);
            previous = Some(next);
            next.as_secs()
        })
        .collect()
}

#[test]
fn test_linear_increase_steps_until_clamped() {
    let s = strategy(StrategyKind::LinearIncrease, 1, 10, Some(2));
    assert_eq!(sequence(&s, &progress(), 7), vec![1, 3, 5, 7, 9, 10, 10]);
    assert_eq!(s.next_retry(Some(secs(9)), &no_progress()), secs(1));
}

#[test]
fn test_linear_adopt_walks_both_directions() {
    let s = strategy(StrategyKind::LinearAdopt, 2, 11, Some(3));
    assert_eq!(sequence(&s, &progress(), 5), vec![2, 5, 8, 11, 11]);

    let mut previous = Some(secs(11));
    let mut decayed = Vec::new();
    for _ in 0..5 {
        let next = s.next_retry(previous, &no_progress());
        decayed.push(next.as_secs());
        previous = Some(next);
    }
    assert_eq!(decayed, vec![8, 5, 2, 2, 2]);
}

#[test]
fn test_biexponential_increase_doubles_and_resets() {
    let s = strategy(StrategyKind::BiexponentialIncrease, 2, 40, None);
    assert_eq!(sequence(&s, &progress(), 7), vec![2, 4, 8, 16, 32, 40, 40]);
    assert_eq!(s.next_retry(Some(secs(32)), &no_progress()), secs(2));
}

#[test]
fn test_biexponential_adopt_halves_until_start() {
    let s = strategy(StrategyKind::BiexponentialAdopt, 3, 48, None);

    let mut previous = Some(secs(48));
    let mut decayed = Vec::new();
    for _ in 0..5 {
        let next = s.next_retry(previous, &no_progress());
        decayed.push(next);
        previous = Some(next);
    }
    assert_eq!(
        decayed,
        vec![secs(24), secs(12), secs(6), secs(3), secs(3)]
    );
}

#[test]
fn test_fallback_counts_as_progress() {
    let fallback = NodeSnapshot::new().with_fallback_started(["Fallback1"]);
    for kind in [StrategyKind::LinearIncrease, StrategyKind::BiexponentialIncrease] {
        let s = strategy(kind, 2, 60, Some(2));
        assert_eq!(s.next_retry(Some(secs(4)), &fallback), s.next_retry(Some(secs(4)), &progress()));
    }
}

#[test]
fn test_random_stays_within_bounds() {
    let s = strategy(StrategyKind::Random, 1, 5, None);
    for _ in 0..10_000 {
        let next = s.next_retry(Some(secs(100)), &progress());
        assert!(next >= secs(1) && next <= secs(5));
        assert_eq!(next.subsec_nanos() % 1_000_000, 0, "whole milliseconds");
    }
}

#[test]
fn test_registry_resolves_configured_strategy() {
    let config = DispatcherConfig::from_dict(&json!({
        "strategy": {"name": "biexponential_adopt", "args": {"start_retry": 0.5, "max_retry": 8}}
    }))
    .unwrap();

    let s = StrategyRegistry::with_builtins().resolve(&config.strategy).unwrap();
    assert_eq!(s.kind(), StrategyKind::BiexponentialAdopt);
    assert_eq!(s.next_retry(None, &no_progress()), Duration::from_millis(500));
    assert_eq!(s.next_retry(Some(secs(3)), &no_progress()), Duration::from_millis(1500));
}

#[test]
fn test_invalid_strategy_config_fails_validation() {
    let config = DispatcherConfig::from_dict(&json!({
        "strategy": {"name": "linear_increase", "args": {"start_retry": 10, "max_retry": 5, "step": 1}}
    }))
    .unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigurationError::InvalidValue { .. })
    ));

    let config = DispatcherConfig::from_dict(&json!({"strategy": {"name": "fibonacci"}})).unwrap();
    assert_eq!(
        config.validate(),
        Err(ConfigurationError::UnknownStrategy {
            name: "fibonacci".to_string()
        })
    );
}
