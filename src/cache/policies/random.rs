//! Random-replacement eviction
//!
//! Picks the victim uniformly among the current entries. No ordering
//! metadata is consulted, so reads and overwrites are no-ops.

use crate::cache::ordering::RecencyList;
use crate::cache::policy::EvictionPolicy;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone)]
pub struct RandomReplacementPolicy {
    rng: StdRng,
}

impl Default for RandomReplacementPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomReplacementPolicy {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic victim sequence, used by tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl EvictionPolicy for RandomReplacementPolicy {
    fn on_access(&mut self, _order: &mut RecencyList, _slot: usize) {}

    fn on_overwrite(&mut self, _order: &mut RecencyList, _slot: usize) {}

    fn choose_victim(&mut self, order: &RecencyList) -> Option<usize> {
        order.sample(&mut self.rng)
    }

    fn policy_name(&self) -> &'static str {
        "rr"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_victims_cover_all_entries() {
        let mut order = RecencyList::new();
        let mut policy = RandomReplacementPolicy::with_seed(42);
        for slot in 0..4 {
            policy.on_insert(&mut order, slot);
        }

        let victims: HashSet<usize> = (0..500)
            .filter_map(|_| policy.choose_victim(&order))
            .collect();
        assert_eq!(victims, (0..4).collect());
    }

    #[test]
    fn test_random_on_empty_order() {
        let order = RecencyList::new();
        let mut policy = RandomReplacementPolicy::with_seed(1);
        assert_eq!(policy.choose_victim(&order), None);
    }
}
