//! Retry scheduling functions
//!
//! Every function receives the validated strategy parameters, the interval
//! returned on the previous tick (`None` when scheduling for the first time)
//! and the node outcome snapshot of the current tick. A tick made progress
//! when at least one primary or fallback node started.
//!
//! Results always lie within `[start, max]`. All arithmetic is saturating
//! `Duration` arithmetic, so growth and decay share one representation.

use super::nodes::NodeSnapshot;
use super::StrategyParams;
use rand::Rng;
use std::time::Duration;

/// Signature shared by every registered strategy
pub type StrategyFn = fn(&StrategyParams, Option<Duration>, &NodeSnapshot) -> Duration;

/// Grow by `step` on progress, snap back to `start` otherwise
pub fn linear_increase(
    params: &StrategyParams,
    previous_retry: Option<Duration>,
    nodes: &NodeSnapshot,
) -> Duration {
    let Some(previous) = previous_retry else {
        return params.start();
    };

    if nodes.has_progress() {
        params.clamp(previous.saturating_add(params.step()))
    } else {
        params.start()
    }
}

/// Grow by `step` on progress, shrink by `step` otherwise
pub fn linear_adopt(
    params: &StrategyParams,
    previous_retry: Option<Duration>,
    nodes: &NodeSnapshot,
) -> Duration {
    let Some(previous) = previous_retry else {
        return params.start();
    };

    if nodes.has_progress() {
        params.clamp(previous.saturating_add(params.step()))
    } else {
        params.clamp(previous.saturating_sub(params.step()))
    }
}

/// Double on progress, snap back to `start` otherwise
pub fn biexponential_increase(
    params: &StrategyParams,
    previous_retry: Option<Duration>,
    nodes: &NodeSnapshot,
) -> Duration {
    let Some(previous) = previous_retry else {
        return params.start();
    };

    if nodes.has_progress() {
        params.clamp(previous.saturating_mul(2))
    } else {
        params.start()
    }
}

/// Double on progress, halve otherwise
pub fn biexponential_adopt(
    params: &StrategyParams,
    previous_retry: Option<Duration>,
    nodes: &NodeSnapshot,
) -> Duration {
    let Some(previous) = previous_retry else {
        return params.start();
    };

    if nodes.has_progress() {
        params.clamp(previous.saturating_mul(2))
    } else {
        params.clamp(previous / 2)
    }
}

/// Uniformly random whole number of milliseconds in `[start, max]`
///
/// Ignores the previous interval and the node outcomes.
pub fn random(
    params: &StrategyParams,
    _previous_retry: Option<Duration>,
    _nodes: &NodeSnapshot,
) -> Duration {
    random_with(&mut rand::thread_rng(), params)
}

pub(crate) fn random_with<R: Rng + ?Sized>(rng: &mut R, params: &StrategyParams) -> Duration {
    let low = ceil_millis(params.start());
    let high = floor_millis(params.max());
    if low > high {
        // no whole millisecond inside the range
        return params.start();
    }
    Duration::from_millis(rng.gen_range(low..=high))
}

fn floor_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn ceil_millis(duration: Duration) -> u64 {
    let floor = floor_millis(duration);
    if Duration::from_millis(floor) < duration {
        floor.saturating_add(1)
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn linear() -> StrategyParams {
        StrategyParams::new(secs(2), secs(10)).unwrap().with_step(secs(3)).unwrap()
    }

    fn exponential() -> StrategyParams {
        StrategyParams::new(secs(2), secs(60)).unwrap()
    }

    fn progress() -> NodeSnapshot {
        NodeSnapshot::new().with_started(["Task1"])
    }

    fn fallback_progress() -> NodeSnapshot {
        NodeSnapshot::new().with_fallback_started(["Fallback1"])
    }

    fn stalled() -> NodeSnapshot {
        NodeSnapshot::new().with_active(["Task1"]).with_failed(["Task2"])
    }

    #[test]
    fn test_linear_increase_grows_and_clamps() {
        let params = linear();
        assert_eq!(linear_increase(&params, Some(secs(2)), &progress()), secs(5));
        assert_eq!(linear_increase(&params, Some(secs(5)), &fallback_progress()), secs(8));
        assert_eq!(linear_increase(&params, Some(secs(8)), &progress()), secs(10));
        assert_eq!(linear_increase(&params, Some(secs(10)), &progress()), secs(10));
    }

    #[test]
    fn test_linear_increase_resets_without_progress() {
        let params = linear();
        assert_eq!(linear_increase(&params, Some(secs(8)), &stalled()), secs(2));
        assert_eq!(linear_increase(&params, None, &progress()), secs(2));
    }

    #[test]
    fn test_linear_adopt_decays_gradually() {
        let params = linear();
        assert_eq!(linear_adopt(&params, Some(secs(10)), &stalled()), secs(7));
        assert_eq!(linear_adopt(&params, Some(secs(7)), &stalled()), secs(4));
        assert_eq!(linear_adopt(&params, Some(secs(4)), &stalled()), secs(2));
        assert_eq!(linear_adopt(&params, Some(secs(2)), &stalled()), secs(2));
        assert_eq!(linear_adopt(&params, Some(secs(4)), &progress()), secs(7));
    }

    #[test]
    fn test_biexponential_increase() {
        let params = exponential();
        assert_eq!(biexponential_increase(&params, None, &progress()), secs(2));
        assert_eq!(biexponential_increase(&params, Some(secs(2)), &progress()), secs(4));
        assert_eq!(biexponential_increase(&params, Some(secs(32)), &progress()), secs(60));
        assert_eq!(biexponential_increase(&params, Some(secs(32)), &stalled()), secs(2));
    }

    #[test]
    fn test_biexponential_adopt_halves_exactly() {
        let params = exponential();
        assert_eq!(biexponential_adopt(&params, None, &stalled()), secs(2));
        assert_eq!(biexponential_adopt(&params, Some(secs(60)), &stalled()), secs(30));
        // odd values halve without truncation
        assert_eq!(
            biexponential_adopt(&params, Some(secs(15)), &stalled()),
            Duration::from_millis(7500)
        );
        assert_eq!(biexponential_adopt(&params, Some(secs(3)), &stalled()), secs(2));
        assert_eq!(biexponential_adopt(&params, Some(secs(40)), &progress()), secs(60));
    }

    #[test]
    fn test_saturating_growth_never_overflows() {
        let params = StrategyParams::new(secs(1), Duration::MAX)
            .unwrap()
            .with_step(Duration::MAX)
            .unwrap();
        assert_eq!(
            biexponential_increase(&params, Some(Duration::MAX), &progress()),
            Duration::MAX
        );
        assert_eq!(
            linear_increase(&params, Some(Duration::MAX), &progress()),
            Duration::MAX
        );
        assert_eq!(linear_adopt(&params, Some(secs(1)), &stalled()), secs(1));
    }

    #[test]
    fn test_random_stays_in_range() {
        let params = StrategyParams::new(secs(1), secs(3)).unwrap();
        for _ in 0..10_000 {
            let value = random(&params, None, &stalled());
            assert!(value >= secs(1) && value <= secs(3), "{value:?} out of range");
        }
    }

    #[test]
    fn test_random_inclusive_bounds_reachable() {
        let params = StrategyParams::new(Duration::from_millis(5), Duration::from_millis(6)).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen_low = false;
        let mut seen_high = false;
        for _ in 0..1_000 {
            match random_with(&mut rng, &params).as_millis() {
                5 => seen_low = true,
                6 => seen_high = true,
                other => panic!("unexpected {other}"),
            }
        }
        assert!(seen_low && seen_high);
    }

    #[test]
    fn test_random_sub_millisecond_range() {
        let params =
            StrategyParams::new(Duration::from_micros(1_100), Duration::from_micros(1_900)).unwrap();
        assert_eq!(random(&params, None, &stalled()), Duration::from_micros(1_100));
    }
}
