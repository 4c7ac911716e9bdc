use proptest::prelude::*;
use std::time::Duration;
use taskflow_core::cache::PolicyKind;
use taskflow_core::strategy::{NodeSnapshot, StrategyKind, StrategyParams};

/// Strategy for generating any built-in eviction policy
pub fn policy_strategy() -> impl Strategy<Value = PolicyKind> {
    prop::sample::select(PolicyKind::ALL.to_vec())
}

/// Strategy for generating any built-in retry strategy
pub fn strategy_kind_strategy() -> impl Strategy<Value = StrategyKind> {
    prop::sample::select(StrategyKind::ALL.to_vec())
}

/// Cache operations over a small key space so overwrites and hits happen
#[derive(Debug, Clone)]
pub enum CacheOp {
    Add(u8, u32),
    Get(u8),
}

pub fn cache_ops_strategy() -> impl Strategy<Value = Vec<CacheOp>> {
    prop::collection::vec(
        prop_oneof![
            (0u8..24, any::<u32>()).prop_map(|(k, v)| CacheOp::Add(k, v)),
            (0u8..24).prop_map(CacheOp::Get),
        ],
        0..200,
    )
}

/// Valid strategy parameters: `start <= max`, positive start and step
pub fn params_strategy() -> impl Strategy<Value = StrategyParams> {
    (1u64..5_000, 0u64..120_000, 1u64..10_000).prop_map(|(start, extra, step)| {
        StrategyParams::new(
            Duration::from_millis(start),
            Duration::from_millis(start + extra),
        )
        .and_then(|params| params.with_step(Duration::from_millis(step)))
        .expect("generated parameters are valid")
    })
}

pub fn previous_retry_strategy() -> impl Strategy<Value = Option<Duration>> {
    prop::option::of((0u64..1_000_000).prop_map(Duration::from_millis))
}

fn names(prefix: &'static str) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec((0u8..5).prop_map(move |i| format!("{prefix}{i}")), 0..4)
}

/// Node snapshot with arbitrary (possibly empty) outcome sets
pub fn snapshot_strategy() -> impl Strategy<Value = NodeSnapshot> {
    (names("Active"), names("Failed"), names("Task"), names("Fallback")).prop_map(
        |(active, failed, started, fallback_started)| NodeSnapshot {
            active,
            failed,
            started,
            fallback_started,
        },
    )
}
