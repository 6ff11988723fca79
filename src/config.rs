use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub http: HttpConfig,
  /// Mirror log output into this file (stderr only if not set)
  pub log_file: Option<PathBuf>,
  /// How many fetches may be in flight at once
  #[serde(default = "default_concurrency")]
  pub concurrency: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      cache: CacheConfig::default(),
      http: HttpConfig::default(),
      log_file: None,
      concurrency: default_concurrency(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Cache store name; selects the backing database file
  #[serde(default = "default_store")]
  pub store: String,
  /// Directory for store files (default: platform data dir)
  pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      store: default_store(),
      dir: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
  /// Timeout for each outgoing request, in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for HttpConfig {
  fn default() -> Self {
    Self {
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_store() -> String {
  "default".to_string()
}

fn default_timeout_secs() -> u64 {
  60
}

fn default_concurrency() -> usize {
  4
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./oget.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/oget/config.yaml
  ///
  /// Every field has a default, so running without any config file is
  /// fine.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("oget.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("oget").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Store name override from the environment.
  ///
  /// Checks OGET_STORE; the command line takes precedence over this.
  pub fn store_override() -> Option<String> {
    std::env::var("OGET_STORE").ok()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_config_uses_defaults() {
    let config: Config = serde_yaml::from_str("{}").unwrap();

    assert_eq!(config.cache.store, "default");
    assert!(config.cache.dir.is_none());
    assert_eq!(config.http.timeout_secs, 60);
    assert_eq!(config.concurrency, 4);
    assert!(config.log_file.is_none());
  }

  #[test]
  fn test_full_config_parses() {
    let yaml = r#"
cache:
  store: docs
  dir: /tmp/oget-stores
http:
  timeout_secs: 10
log_file: /tmp/oget.log
concurrency: 8
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(config.cache.store, "docs");
    assert_eq!(config.cache.dir, Some(PathBuf::from("/tmp/oget-stores")));
    assert_eq!(config.http.timeout_secs, 10);
    assert_eq!(config.concurrency, 8);
    assert_eq!(config.log_file, Some(PathBuf::from("/tmp/oget.log")));
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let result = Config::load(Some(Path::new("/nonexistent/oget.yaml")));
    assert!(result.is_err());
  }
}
