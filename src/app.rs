//! Application wiring: builds request descriptors from the command line
//! and drives the fetches.

use color_eyre::{eyre::eyre, Result};
use futures::StreamExt;
use reqwest::Method;
use std::path::Path;
use tracing::error;
use url::Url;

use crate::cache::FetchOutcome;
use crate::config::Config;
use crate::net::intercepted::InterceptedClient;
use crate::net::types::{FetchRequest, FetchResponse};

/// Main application: one intercepted client shared by all episodes.
pub struct App {
  client: InterceptedClient,
  concurrency: usize,
}

impl App {
  pub fn new(config: &Config) -> Result<Self> {
    let client = InterceptedClient::new(config)?;

    Ok(Self {
      client,
      concurrency: config.concurrency.max(1),
    })
  }

  /// Fetch all requests with bounded concurrency and emit their bodies.
  ///
  /// Episodes run independently; results are emitted in input order.
  /// Returns the number of requests that resolved to no usable response.
  pub async fn run(&self, requests: Vec<FetchRequest>, output: Option<&Path>) -> Result<usize> {
    let client = &self.client;

    let outcomes: Vec<(FetchRequest, Result<FetchOutcome>)> = futures::stream::iter(requests)
      .map(|request| async move {
        let outcome = client.fetch(&request).await;
        (request, outcome)
      })
      .buffered(self.concurrency)
      .collect()
      .await;

    let mut unavailable = 0usize;
    for (request, outcome) in outcomes {
      match outcome? {
        FetchOutcome::Network(response) | FetchOutcome::Fallback { response, .. } => {
          emit(&response, output)?;
        }
        FetchOutcome::Unavailable { error: cause } => {
          error!(
            request = %request.describe(),
            error = %cause,
            "no response available: network failed and nothing cached"
          );
          unavailable += 1;
        }
      }
    }

    Ok(unavailable)
  }
}

/// Write a response body to the output file, or stdout when none is given.
fn emit(response: &FetchResponse, output: Option<&Path>) -> Result<()> {
  match output {
    Some(path) => {
      std::fs::write(path, &response.body)
        .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;
    }
    None => {
      use std::io::Write;
      std::io::stdout()
        .write_all(&response.body)
        .map_err(|e| eyre!("Failed to write response body: {}", e))?;
    }
  }

  Ok(())
}

/// Build request descriptors from command-line pieces.
pub fn build_requests(
  urls: &[String],
  method: &str,
  raw_headers: &[String],
  body: Option<&str>,
) -> Result<Vec<FetchRequest>> {
  let method = Method::from_bytes(method.to_uppercase().as_bytes())
    .map_err(|e| eyre!("Invalid HTTP method {}: {}", method, e))?;

  let headers = raw_headers
    .iter()
    .map(|raw| parse_header(raw))
    .collect::<Result<Vec<_>>>()?;

  urls
    .iter()
    .map(|raw| {
      let url = Url::parse(raw).map_err(|e| eyre!("Invalid URL {}: {}", raw, e))?;

      Ok(FetchRequest {
        method: method.clone(),
        url,
        headers: headers.clone(),
        body: body.map(|b| b.as_bytes().to_vec()),
      })
    })
    .collect()
}

/// Parse one repeatable `-H "Name: value"` argument.
fn parse_header(raw: &str) -> Result<(String, String)> {
  let (name, value) = raw
    .split_once(':')
    .ok_or_else(|| eyre!("Invalid header (expected \"Name: value\"): {}", raw))?;

  let name = name.trim();
  if name.is_empty() {
    return Err(eyre!("Invalid header (empty name): {}", raw));
  }

  Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_header_splits_on_first_colon() {
    let (name, value) = parse_header("Referer: https://example.com/").unwrap();
    assert_eq!(name, "Referer");
    assert_eq!(value, "https://example.com/");
  }

  #[test]
  fn test_parse_header_rejects_missing_colon() {
    assert!(parse_header("not-a-header").is_err());
  }

  #[test]
  fn test_parse_header_rejects_empty_name() {
    assert!(parse_header(": value").is_err());
  }

  #[test]
  fn test_build_requests_normalizes_method() {
    let urls = vec!["https://example.com/data.json".to_string()];
    let requests = build_requests(&urls, "get", &[], None).unwrap();

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert!(requests[0].body.is_none());
  }

  #[test]
  fn test_build_requests_shares_headers_and_body() {
    let urls = vec![
      "https://example.com/a".to_string(),
      "https://example.com/b".to_string(),
    ];
    let headers = vec!["Accept: application/json".to_string()];
    let requests = build_requests(&urls, "POST", &headers, Some("payload")).unwrap();

    assert_eq!(requests.len(), 2);
    for request in &requests {
      assert_eq!(request.method, Method::POST);
      assert_eq!(
        request.headers,
        vec![("Accept".to_string(), "application/json".to_string())]
      );
      assert_eq!(request.body, Some(b"payload".to_vec()));
    }
  }

  #[test]
  fn test_build_requests_rejects_bad_url() {
    let urls = vec!["not a url".to_string()];
    assert!(build_requests(&urls, "GET", &[], None).is_err());
  }
}
