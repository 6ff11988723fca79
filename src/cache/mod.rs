//! Response caching for offline support.
//!
//! This module provides the network-first interception policy and its
//! persistent store:
//! - Every successful response is copied into a named store, one entry per
//!   request key (method + URL), newest write wins
//! - When the network fails, the last stored response for the same key is
//!   served instead
//! - Entries are never expired or deleted; the store persists across runs

pub mod layer;
pub mod storage;
pub mod traits;

pub use layer::InterceptLayer;
pub use storage::SqliteStore;
pub use traits::{CacheStore, CachedResponse, FetchOutcome};
