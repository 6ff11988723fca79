//! The interception layer: network first, cache fallback.

use color_eyre::Result;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use super::traits::{CacheStore, FetchOutcome};
use crate::net::types::{FetchRequest, FetchResponse};

/// Applies the network-first, cache-fallback policy to every request it
/// observes, against a single shared store.
///
/// One episode per request; episodes are independent and share nothing but
/// the store, so concurrent writers to the same key interleave as
/// last-writer-wins. A successful response is copied into the store before
/// it is returned, which keeps the store holding the last response that
/// actually reached a caller.
pub struct InterceptLayer<S: CacheStore> {
  store: Arc<S>,
}

impl<S: CacheStore> InterceptLayer<S> {
  /// Create a new layer around an already-opened store.
  pub fn new(store: S) -> Self {
    Self {
      store: Arc::new(store),
    }
  }

  /// Handle one intercepted request.
  ///
  /// Exactly one network attempt via `fetcher`; on transport failure,
  /// exactly one store lookup. Transport errors never escape as `Err` —
  /// a miss on fallback comes back as [`FetchOutcome::Unavailable`].
  /// `Err` from this method always means the store itself failed.
  pub async fn handle<F, Fut>(&self, request: &FetchRequest, fetcher: F) -> Result<FetchOutcome>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<FetchResponse>>,
  {
    let key = request.cache_key();

    match fetcher().await {
      Ok(response) => {
        // Copy into the store before handing the response back
        self.store.put(&key, &request.describe(), &response)?;
        info!(
          request = %request.describe(),
          status = response.status,
          "served from network, copy cached"
        );
        Ok(FetchOutcome::Network(response))
      }
      Err(err) => {
        warn!(
          request = %request.describe(),
          error = %err,
          "network failed, consulting cache"
        );

        match self.store.get(&key)? {
          Some(cached) => {
            info!(
              request = %cached.request,
              cached_at = %cached.cached_at,
              "served from cache fallback"
            );
            Ok(FetchOutcome::Fallback {
              response: cached.response,
              cached_at: cached.cached_at,
            })
          }
          None => Ok(FetchOutcome::Unavailable {
            error: err.to_string(),
          }),
        }
      }
    }
  }
}

impl<S: CacheStore> Clone for InterceptLayer<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
    }
  }
}
