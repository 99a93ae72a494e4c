//! # Storage Layer
//!
//! This module defines the durable key-value abstraction the repository sits
//! on. The [`KeyValueStore`] trait models an on-device string store: it is
//! crash-safe per individual key write, but offers no cross-key transactions
//! and no optimistic-lock primitive.
//!
//! Storage is abstracted behind a trait to:
//! - Enable **testing** with [`memory::InMemoryStore`] (no filesystem needed)
//! - Allow **future backends** without changing the repository
//! - Keep business logic **decoupled** from persistence details
//!
//! All operations are async; the store call is the only suspension point in
//! the whole crate. The store is assumed local and fast, so there is no
//! cancellation and no timeout.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production file-based storage, one file per key,
//!   atomic tmp-then-rename writes
//! - [`memory::InMemoryStore`]: in-memory storage for tests

use async_trait::async_trait;

use crate::error::Result;

pub mod fs;
pub mod memory;

/// Abstract interface for the durable on-device key-value store.
///
/// Implementations must serialize reads/writes per key in arrival order, so a
/// caller that awaits one operation before issuing the next observes a
/// consistent read-after-write view.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`. Returns `Ok(None)` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key held by this store.
    async fn clear(&self) -> Result<()>;
}
