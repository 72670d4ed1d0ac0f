//! Persistence for guild configuration and emoji → role associations

pub mod config;
pub mod error;
pub mod json;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod store;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use json::JsonStore;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
pub use store::AssociationStore;
