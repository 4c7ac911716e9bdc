//! Built-in eviction policy implementations

pub mod fifo;
pub mod lifo;
pub mod lru;
pub mod mru;
pub mod random;

pub use fifo::FifoPolicy;
pub use lifo::LifoPolicy;
pub use lru::LruPolicy;
pub use mru::MruPolicy;
pub use random::RandomReplacementPolicy;
