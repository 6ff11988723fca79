//! Intercepted client: every fetch passes through the interception layer.

use color_eyre::Result;

use crate::cache::{FetchOutcome, InterceptLayer, SqliteStore};
use crate::config::Config;

use super::client::HttpClient;
use super::types::FetchRequest;

/// HTTP client with the interception layer registered as its one pipeline
/// stage.
///
/// Wraps the plain client and provides the same fetch surface, but every
/// outgoing request is observed by the layer: served from the network when
/// possible, from the store when not. There is no bypass path.
#[derive(Clone)]
pub struct InterceptedClient {
  inner: HttpClient,
  layer: InterceptLayer<SqliteStore>,
}

impl InterceptedClient {
  /// Create a new intercepted client.
  ///
  /// Opens (or creates) the configured cache store once; all episodes on
  /// this client and its clones share that store handle.
  pub fn new(config: &Config) -> Result<Self> {
    let inner = HttpClient::new(config)?;
    let store = SqliteStore::open(&config.cache.store, config.cache.dir.as_deref())?;
    let layer = InterceptLayer::new(store);

    Ok(Self { inner, layer })
  }

  /// Fetch one request through the layer.
  pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchOutcome> {
    self
      .layer
      .handle(request, || {
        let inner = self.inner.clone();
        let request = request.clone();
        async move { inner.execute(&request).await }
      })
      .await
  }
}
