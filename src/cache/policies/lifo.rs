//! Last-in, first-out eviction

use crate::cache::ordering::RecencyList;
use crate::cache::policy::EvictionPolicy;

/// Evicts the most recently inserted entry
///
/// Overwriting an existing key counts as a re-insertion and moves it to the
/// newest end; reads leave the order untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifoPolicy;

impl EvictionPolicy for LifoPolicy {
    fn on_access(&mut self, _order: &mut RecencyList, _slot: usize) {}

    fn on_overwrite(&mut self, order: &mut RecencyList, slot: usize) {
        order.touch(slot);
    }

    fn choose_victim(&mut self, order: &RecencyList) -> Option<usize> {
        order.newest()
    }

    fn policy_name(&self) -> &'static str {
        "lifo"
    }
}
