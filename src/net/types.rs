//! Request and response descriptors shared by the network client and the
//! response cache.

use reqwest::Method;
use sha2::{Digest, Sha256};
use url::Url;

/// An outgoing request as observed by the interception layer.
///
/// Read-only input: the same descriptor is both the network call argument
/// and the source of the cache key. Headers and body do not participate in
/// the key.
#[derive(Debug, Clone)]
pub struct FetchRequest {
  pub method: Method,
  pub url: Url,
  pub headers: Vec<(String, String)>,
  pub body: Option<Vec<u8>>,
}

impl FetchRequest {
  /// Plain GET request for a URL.
  #[allow(dead_code)]
  pub fn get(url: Url) -> Self {
    Self {
      method: Method::GET,
      url,
      headers: Vec::new(),
      body: None,
    }
  }

  /// Cache key for this request: method plus full URL, matched exactly.
  ///
  /// SHA256 hash for stable, fixed-length keys.
  pub fn cache_key(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.method.as_str().as_bytes());
    hasher.update(b" ");
    hasher.update(self.url.as_str().as_bytes());
    hex::encode(hasher.finalize())
  }

  /// Human-readable request identity for logs and stored entries.
  pub fn describe(&self) -> String {
    format!("{} {}", self.method, self.url)
  }
}

/// A fully buffered response.
///
/// Buffering the whole body up front gives the caller and the cache
/// independent copies; neither can observe a stream drained by the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
  pub status: u16,
  pub headers: Vec<(String, String)>,
  pub body: Vec<u8>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request(method: Method, url: &str) -> FetchRequest {
    FetchRequest {
      method,
      url: Url::parse(url).unwrap(),
      headers: Vec::new(),
      body: None,
    }
  }

  #[test]
  fn test_cache_key_is_stable() {
    let a = request(Method::GET, "https://example.com/data.json");
    let b = request(Method::GET, "https://example.com/data.json");
    assert_eq!(a.cache_key(), b.cache_key());
  }

  #[test]
  fn test_cache_key_distinguishes_method() {
    let get = request(Method::GET, "https://example.com/data.json");
    let head = request(Method::HEAD, "https://example.com/data.json");
    assert_ne!(get.cache_key(), head.cache_key());
  }

  #[test]
  fn test_cache_key_distinguishes_query_string() {
    let plain = request(Method::GET, "https://example.com/data.json");
    let query = request(Method::GET, "https://example.com/data.json?page=2");
    assert_ne!(plain.cache_key(), query.cache_key());
  }

  #[test]
  fn test_cache_key_ignores_headers() {
    let mut with_header = request(Method::GET, "https://example.com/data.json");
    with_header
      .headers
      .push(("Accept".to_string(), "application/json".to_string()));
    let without = request(Method::GET, "https://example.com/data.json");
    assert_eq!(with_header.cache_key(), without.cache_key());
  }

  #[test]
  fn test_describe_includes_method_and_url() {
    let req = request(Method::GET, "https://example.com/data.json");
    assert_eq!(req.describe(), "GET https://example.com/data.json");
  }
}
