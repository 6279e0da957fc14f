//! Record Store Gateway: the single point of access to the animal collection.
//!
//! [`AnimalShelter`] wraps insert, query, bulk update and bulk delete against
//! one collection. Each operation comes in two forms: `try_*` returns a typed
//! [`StoreError`] so callers can branch on the cause, and the plain form folds
//! every failure into a safe sentinel (`false`, empty, `0`) after logging it.

pub mod collection;
pub mod error;
pub mod memory;
pub mod shelter;
#[cfg(feature = "test-utils")]
pub mod testutil;

pub use collection::RecordCollection;
pub use error::StoreError;
pub use memory::MemoryCollection;
pub use shelter::AnimalShelter;
