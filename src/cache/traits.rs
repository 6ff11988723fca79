//! Core trait and types for the response cache.

use chrono::{DateTime, Utc};
use color_eyre::Result;

use crate::net::types::FetchResponse;

/// Trait for cache store backends.
///
/// A store is a named, durable key-value container holding at most one
/// response per request key. Each operation is a single atomic key
/// operation; the interception layer never needs multi-step transactions.
pub trait CacheStore: Send + Sync {
  /// Store a response under `key`, overwriting any prior entry.
  ///
  /// `request` is the human-readable request identity, kept alongside the
  /// entry for diagnostics.
  fn put(&self, key: &str, request: &str, response: &FetchResponse) -> Result<()>;

  /// Look up the entry for `key`.
  fn get(&self, key: &str) -> Result<Option<CachedResponse>>;
}

/// One stored entry: a previously successful response plus its metadata.
#[derive(Debug, Clone)]
pub struct CachedResponse {
  /// The response as originally received
  pub response: FetchResponse,
  /// Request identity the entry was stored under (e.g. "GET https://...")
  pub request: String,
  /// When the entry was written
  pub cached_at: DateTime<Utc>,
}

/// Outcome of one interception episode.
///
/// Store failures are not represented here; they surface as errors from
/// the layer itself, distinct from any of these outcomes.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
  /// Live response from the network; an independent copy was written to
  /// the store before this was returned.
  Network(FetchResponse),
  /// Network failed; serving the most recently stored response.
  Fallback {
    response: FetchResponse,
    cached_at: DateTime<Utc>,
  },
  /// Network failed and the store holds nothing for this request. Carries
  /// the transport error text so callers can present a meaningful offline
  /// message.
  Unavailable { error: String },
}
