//! First-in, first-out eviction
//!
//! The victim is the entry with the oldest insertion rank. Reads never change
//! the order and overwriting a value keeps the original insertion rank.

use crate::cache::ordering::RecencyList;
use crate::cache::policy::EvictionPolicy;

#[derive(Debug, Clone, Copy, Default)]
pub struct FifoPolicy;

impl EvictionPolicy for FifoPolicy {
    fn on_access(&mut self, _order: &mut RecencyList, _slot: usize) {}

    fn on_overwrite(&mut self, _order: &mut RecencyList, _slot: usize) {}

    fn choose_victim(&mut self, order: &RecencyList) -> Option<usize> {
        order.oldest()
    }

    fn policy_name(&self) -> &'static str {
        "fifo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_ignores_access_and_overwrite() {
        let mut order = RecencyList::new();
        let mut policy = FifoPolicy;
        policy.on_insert(&mut order, 0);
        policy.on_insert(&mut order, 1);

        policy.on_access(&mut order, 0);
        policy.on_overwrite(&mut order, 0);

        assert_eq!(policy.choose_victim(&order), Some(0));
    }
}
