#![allow(clippy::doc_markdown)] // Allow technical terms like FIFO, LRU in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Taskflow Core
//!
//! Retry scheduling and result caching core of a distributed task-flow
//! dispatcher.
//!
//! ## Overview
//!
//! For every running flow instance the dispatcher decides when to re-check
//! the flow and whether a previously computed task result can be reused
//! instead of executing the task again.
//!
//! ## Architecture
//!
//! - **Retry strategies** compute the next polling interval from the node
//!   outcomes of the current tick and the previous interval.
//! - **Result caches** are bounded stores with FIFO, LIFO, LRU, MRU or random
//!   replacement eviction sitting in front of the storage adapter.
//! - **The dispatcher** drives flows through a [`dispatcher::FlowDriver`],
//!   executes nodes through a [`dispatcher::TaskQueue`] and persists results
//!   through a [`storage::DataStorage`] adapter.
//!
//! ## Module Organization
//!
//! - [`cache`] - Eviction policies, bounded result cache and cache registry
//! - [`strategy`] - Retry scheduling functions and the strategy registry
//! - [`storage`] - Storage adapter trait and the in-memory adapter
//! - [`dispatcher`] - The dispatch loop and its collaborator traits
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Crate-level error type
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskflow_core::config::ConfigManager;
//! use taskflow_core::dispatcher::{Dispatcher, FlowDriver, TaskQueue};
//! use taskflow_core::storage::InMemoryStorage;
//!
//! # async fn example(
//! #     queue: Arc<dyn TaskQueue>,
//! #     driver: &dyn FlowDriver,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! taskflow_core::logging::init_structured_logging();
//!
//! let config = ConfigManager::load()?.shared();
//! let storage = Arc::new(InMemoryStorage::connected());
//! let dispatcher = Dispatcher::new(config, queue, storage)?;
//!
//! let report = dispatcher
//!     .run_flow(driver, "flow1", serde_json::json!({"user": 42}))
//!     .await?;
//! println!("finished after {} ticks", report.ticks);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod storage;
pub mod strategy;

pub use cache::{CacheError, CacheRegistry, CacheScope, PolicyKind, ResultCache, ResultKey};
pub use config::{ConfigManager, ConfigurationError, DispatcherConfig};
pub use dispatcher::{Dispatcher, FlowDriver, NodeRequest, TaskFailure, TaskQueue};
pub use error::{DispatchError, DispatchResult};
pub use storage::{DataStorage, InMemoryStorage, StorageError};
pub use strategy::{NodeSnapshot, RetryStrategy, StrategyKind, StrategyRegistry};
