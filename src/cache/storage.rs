//! SQLite implementation of the cache store.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::traits::{CacheStore, CachedResponse};
use crate::net::types::FetchResponse;

/// SQLite-backed response store. One database file per store name, created
/// lazily on first open; rows are written with `INSERT OR REPLACE`, so a
/// key either holds its previous entry or the new one, never a torn write.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open or create the named store.
  ///
  /// Opening is idempotent: a second open of the same name observes the
  /// same logical store. The backing file lives under `dir`, or the
  /// platform data directory when no directory is configured.
  pub fn open(name: &str, dir: Option<&Path>) -> Result<Self> {
    let path = Self::store_path(name, dir)?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache store at {}: {}", path.display(), e))?;

    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// In-memory store for tests.
  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache store: {}", e))?;

    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// Resolve the database path for a store name.
  fn store_path(name: &str, dir: Option<&Path>) -> Result<PathBuf> {
    let base = match dir {
      Some(d) => d.to_path_buf(),
      None => dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
        .ok_or_else(|| eyre!("Could not determine data directory"))?
        .join("oget"),
    };

    Ok(base.join(format!("{}.db", name)))
  }

  /// Run database migrations for the cache table.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for the response cache.
const CACHE_SCHEMA: &str = r#"
-- One row per request key; replaced wholesale on every successful fetch
CREATE TABLE IF NOT EXISTS response_cache (
    request_key TEXT PRIMARY KEY,
    request TEXT NOT NULL,
    status INTEGER NOT NULL,
    headers TEXT NOT NULL,
    body BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl CacheStore for SqliteStore {
  fn put(&self, key: &str, request: &str, response: &FetchResponse) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let headers = serde_json::to_string(&response.headers)
      .map_err(|e| eyre!("Failed to serialize headers: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO response_cache (request_key, request, status, headers, body, cached_at)
         VALUES (?, ?, ?, ?, ?, datetime('now'))",
        params![key, request, response.status, headers, response.body],
      )
      .map_err(|e| eyre!("Failed to store response: {}", e))?;

    Ok(())
  }

  fn get(&self, key: &str) -> Result<Option<CachedResponse>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare(
        "SELECT request, status, headers, body, cached_at FROM response_cache
         WHERE request_key = ?",
      )
      .map_err(|e| eyre!("Failed to prepare lookup: {}", e))?;

    let row: Option<(String, u16, String, Vec<u8>, String)> = stmt
      .query_row(params![key], |row| {
        Ok((
          row.get(0)?,
          row.get(1)?,
          row.get(2)?,
          row.get(3)?,
          row.get(4)?,
        ))
      })
      .ok();

    match row {
      Some((request, status, headers_json, body, cached_at_str)) => {
        let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)
          .map_err(|e| eyre!("Failed to deserialize headers: {}", e))?;
        let cached_at = parse_datetime(&cached_at_str)?;

        Ok(Some(CachedResponse {
          response: FetchResponse {
            status,
            headers,
            body,
          },
          request,
          cached_at,
        }))
      }
      None => Ok(None),
    }
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn response(status: u16, body: &[u8]) -> FetchResponse {
    FetchResponse {
      status,
      headers: vec![("content-type".to_string(), "application/json".to_string())],
      body: body.to_vec(),
    }
  }

  fn row_count(store: &SqliteStore) -> i64 {
    let conn = store.conn.lock().unwrap();
    conn
      .query_row("SELECT COUNT(*) FROM response_cache", [], |row| row.get(0))
      .unwrap()
  }

  #[test]
  fn test_miss_returns_none() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert!(store.get("nope").unwrap().is_none());
  }

  #[test]
  fn test_put_then_get_roundtrip() {
    let store = SqliteStore::open_in_memory().unwrap();
    let stored = response(404, b"not found");

    store
      .put("key1", "GET https://example.com/missing.json", &stored)
      .unwrap();

    let cached = store.get("key1").unwrap().unwrap();
    assert_eq!(cached.response, stored);
    assert_eq!(cached.request, "GET https://example.com/missing.json");
  }

  #[test]
  fn test_put_overwrites_prior_entry() {
    let store = SqliteStore::open_in_memory().unwrap();
    let request = "GET https://example.com/data.json";

    store.put("key1", request, &response(200, br#"{"v":1}"#)).unwrap();
    store.put("key1", request, &response(200, br#"{"v":2}"#)).unwrap();
    store.put("key1", request, &response(200, br#"{"v":3}"#)).unwrap();

    let cached = store.get("key1").unwrap().unwrap();
    assert_eq!(cached.response.body, br#"{"v":3}"#.to_vec());
    assert_eq!(row_count(&store), 1);
  }

  #[test]
  fn test_keys_are_independent() {
    let store = SqliteStore::open_in_memory().unwrap();

    store
      .put("key1", "GET https://example.com/a", &response(200, b"a"))
      .unwrap();
    store
      .put("key2", "GET https://example.com/b", &response(200, b"b"))
      .unwrap();

    assert_eq!(store.get("key1").unwrap().unwrap().response.body, b"a".to_vec());
    assert_eq!(store.get("key2").unwrap().unwrap().response.body, b"b".to_vec());
    assert_eq!(row_count(&store), 2);
  }
}
