//! Thin HTTP client wrapper around reqwest.

use color_eyre::{eyre::eyre, Result};
use std::time::Duration;

use crate::config::Config;

use super::types::{FetchRequest, FetchResponse};

/// Default User-Agent for all outgoing requests.
const USER_AGENT: &str = concat!("oget/", env!("CARGO_PKG_VERSION"));

/// Executes request descriptors against the network.
///
/// Errors from [`HttpClient::execute`] are transport-level only: connect,
/// DNS, timeout, or an interrupted body stream. A resolved response is a
/// success whatever its status code, so error pages replay offline the
/// same as 200s.
#[derive(Clone)]
pub struct HttpClient {
  client: reqwest::Client,
}

impl HttpClient {
  pub fn new(config: &Config) -> Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(USER_AGENT)
      .timeout(Duration::from_secs(config.http.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client })
  }

  /// Execute one request and buffer the complete response.
  pub async fn execute(&self, request: &FetchRequest) -> Result<FetchResponse> {
    let mut builder = self
      .client
      .request(request.method.clone(), request.url.clone());

    for (name, value) in &request.headers {
      builder = builder.header(name, value);
    }

    if let Some(body) = &request.body {
      builder = builder.body(body.clone());
    }

    let response = builder
      .send()
      .await
      .map_err(|e| eyre!("Request failed: {}", e))?;

    let status = response.status().as_u16();
    let headers = response
      .headers()
      .iter()
      .map(|(name, value)| {
        (
          name.as_str().to_string(),
          String::from_utf8_lossy(value.as_bytes()).into_owned(),
        )
      })
      .collect();

    let body = response
      .bytes()
      .await
      .map_err(|e| eyre!("Failed to read response body: {}", e))?
      .to_vec();

    Ok(FetchResponse {
      status,
      headers,
      body,
    })
  }
}
