//! Persistent key-value storage for cart state.
//!
//! The cart only needs three things from storage: read a string under a key,
//! write a string under a key, and forget a key. Anything that can do that
//! implements [`KeyValueStore`] and can back a [`CartStore`](crate::CartStore).
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local map, for tests and throwaway carts
//! - [`FileStore`] - one file per key under a root directory

use async_trait::async_trait;
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refused or could not serve the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value under `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
