//! Recency index shared by every eviction policy
//!
//! Slots are linked into an index-arena doubly-linked list ordered from the
//! newest rank (HEAD side) to the oldest rank (TAIL side). Every link or
//! relink assigns the next value of a monotonically increasing sequence
//! counter, so ordering never depends on wall-clock time.
//!
//! A dense vector of linked slots is kept next to the list so a uniformly
//! random slot can be sampled in O(1) for random replacement.

use rand::Rng;

/// Sentinel links in the arena.
const HEAD: usize = 0; // newest end
const TAIL: usize = 1; // oldest end
const NULL: usize = usize::MAX;
const SENTINELS: usize = 2;

#[derive(Debug, Clone)]
struct Link {
    /// Link toward HEAD (newer).
    prev: usize,
    /// Link toward TAIL (older).
    next: usize,
    rank: u64,
    /// Position in `dense`, `NULL` when unlinked.
    dense: usize,
}

impl Link {
    fn detached() -> Self {
        Self {
            prev: NULL,
            next: NULL,
            rank: 0,
            dense: NULL,
        }
    }

    fn is_linked(&self) -> bool {
        self.dense != NULL
    }
}

/// O(1) ordered index over cache slots
#[derive(Debug, Clone)]
pub struct RecencyList {
    links: Vec<Link>,
    dense: Vec<usize>,
    next_rank: u64,
}

impl Default for RecencyList {
    fn default() -> Self {
        Self::new()
    }
}

impl RecencyList {
    /// Create an empty list
    pub fn new() -> Self {
        let mut links = Vec::with_capacity(16);
        links.push(Link {
            prev: NULL,
            next: TAIL,
            rank: 0,
            dense: NULL,
        });
        links.push(Link {
            prev: HEAD,
            next: NULL,
            rank: 0,
            dense: NULL,
        });

        Self {
            links,
            dense: Vec::new(),
            next_rank: 0,
        }
    }

    /// Number of linked slots
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Check whether `slot` is currently linked
    pub fn contains(&self, slot: usize) -> bool {
        self.links
            .get(slot + SENTINELS)
            .is_some_and(Link::is_linked)
    }

    /// Link `slot` at the newest end with a fresh rank
    ///
    /// Relinks the slot if it is already present.
    pub fn push_newest(&mut self, slot: usize) {
        let idx = slot + SENTINELS;
        if idx >= self.links.len() {
            self.links.resize(idx + 1, Link::detached());
        }

        if self.links[idx].is_linked() {
            self.unlink(idx);
        } else {
            self.links[idx].dense = self.dense.len();
            self.dense.push(slot);
        }

        self.link_after_head(idx);
        self.links[idx].rank = self.next_rank;
        self.next_rank += 1;
    }

    /// Move a linked slot to the newest end with a fresh rank
    ///
    /// Returns `false` when the slot is not linked.
    pub fn touch(&mut self, slot: usize) -> bool {
        if !self.contains(slot) {
            return false;
        }
        self.push_newest(slot);
        true
    }

    /// Unlink `slot`; returns `false` when it was not linked
    pub fn remove(&mut self, slot: usize) -> bool {
        if !self.contains(slot) {
            return false;
        }

        let idx = slot + SENTINELS;
        self.unlink(idx);

        let pos = self.links[idx].dense;
        self.dense.swap_remove(pos);
        if let Some(&moved) = self.dense.get(pos) {
            self.links[moved + SENTINELS].dense = pos;
        }
        self.links[idx] = Link::detached();
        true
    }

    /// Slot holding the newest rank
    pub fn newest(&self) -> Option<usize> {
        let idx = self.links[HEAD].next;
        (idx != TAIL).then(|| idx - SENTINELS)
    }

    /// Slot holding the oldest rank
    pub fn oldest(&self) -> Option<usize> {
        let idx = self.links[TAIL].prev;
        (idx != HEAD).then(|| idx - SENTINELS)
    }

    /// Rank assigned to `slot` on its last link
    pub fn rank(&self, slot: usize) -> Option<u64> {
        self.contains(slot)
            .then(|| self.links[slot + SENTINELS].rank)
    }

    /// Uniformly random linked slot
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.dense.is_empty() {
            return None;
        }
        Some(self.dense[rng.gen_range(0..self.dense.len())])
    }

    /// Linked slots from the newest rank to the oldest
    pub fn iter_newest_first(&self) -> impl Iterator<Item = usize> + '_ {
        let mut cursor = self.links[HEAD].next;
        std::iter::from_fn(move || {
            if cursor == TAIL || cursor == NULL {
                return None;
            }
            let slot = cursor - SENTINELS;
            cursor = self.links[cursor].next;
            Some(slot)
        })
    }

    /// Drop every link; the rank counter keeps counting
    pub fn clear(&mut self) {
        self.links.truncate(SENTINELS);
        self.links[HEAD].next = TAIL;
        self.links[TAIL].prev = HEAD;
        self.dense.clear();
    }

    fn link_after_head(&mut self, idx: usize) {
        let old_first = self.links[HEAD].next;
        self.links[idx].prev = HEAD;
        self.links[idx].next = old_first;
        self.links[HEAD].next = idx;
        self.links[old_first].prev = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.links[idx].prev;
        let next = self.links[idx].next;
        self.links[prev].next = next;
        self.links[next].prev = prev;
        self.links[idx].prev = NULL;
        self.links[idx].next = NULL;
    }
}
