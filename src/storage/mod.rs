//! # Result Storage Adapters
//!
//! [`DataStorage`] is the seam to a persistent result store. Concrete database
//! adapters live outside this crate; [`InMemoryStorage`] provides the
//! reference behaviour used by tests and single-process deployments.

pub mod errors;
pub mod memory;
pub mod traits;

pub use errors::{StorageError, StorageResult};
pub use memory::{ErrorRecord, InMemoryStorage, StoredRecord};
pub use traits::DataStorage;
