//! # Dispatcher
//!
//! The control loop that ties the result cache and the retry strategies
//! together for running flow instances.
//!
//! ```text
//! FlowDriver::schedule ──► SelectiveRun ──► ResultCache ──hit──► reuse
//!                                               │
//!                                              miss
//!                                               ▼
//!                                     TaskQueue::dispatch ──► DataStorage::store
//!                                                             + ResultCache::add
//!                                               │
//!                                               ▼
//!                               RetryStrategy::next_retry ──► sleep / shutdown
//! ```

pub mod core;
pub mod selective;
pub mod tracer;
pub mod traits;
pub mod types;

pub use self::core::{Dispatcher, TickOutcome};
pub use selective::{always_run, RunDecision, SelectiveRun};
pub use tracer::{DispatcherTracer, LoggingTracer, NoopTracer, TraceEvent};
pub use traits::{FlowDriver, TaskQueue};
pub use types::{
    FlowReport, FlowState, NodeRequest, ResultSource, RetryState, Schedule, TaskFailure,
    TaskOutcome,
};
