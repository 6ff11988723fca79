mod app;
mod cache;
mod config;
mod net;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "oget")]
#[command(about = "Offline-first HTTP fetcher: network first, cache fallback")]
#[command(version)]
struct Args {
  /// URLs to fetch
  #[arg(required = true)]
  urls: Vec<String>,

  /// HTTP method to use
  #[arg(short = 'X', long, default_value = "GET")]
  method: String,

  /// Extra request header as "Name: value" (repeatable)
  #[arg(short = 'H', long = "header")]
  headers: Vec<String>,

  /// Request body to send
  #[arg(short, long)]
  data: Option<String>,

  /// Write the response body to this file (single URL only)
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Path to config file (default: $XDG_CONFIG_HOME/oget/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Cache store name (overrides OGET_STORE and the config file)
  #[arg(long)]
  store: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // Resolve the store name: command line beats environment beats config
  let config = if let Some(store) = args.store.or_else(config::Config::store_override) {
    config::Config {
      cache: config::CacheConfig {
        store,
        ..config.cache
      },
      ..config
    }
  } else {
    config
  };

  let _guard = init_tracing(&config)?;

  if args.output.is_some() && args.urls.len() > 1 {
    return Err(eyre!("--output requires exactly one URL"));
  }

  let requests = app::build_requests(
    &args.urls,
    &args.method,
    &args.headers,
    args.data.as_deref(),
  )?;

  let app = app::App::new(&config)?;
  let unavailable = app.run(requests, args.output.as_deref()).await?;

  if unavailable > 0 {
    return Err(eyre!(
      "{} of {} request(s) had no usable response",
      unavailable,
      args.urls.len()
    ));
  }

  Ok(())
}

/// Set up the tracing subscriber: stderr, or a log file when configured.
///
/// Returns the appender guard; it must stay alive for buffered log lines
/// to flush.
fn init_tracing(
  config: &config::Config,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("oget=info"));

  match &config.log_file {
    Some(path) => {
      let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| eyre!("Failed to open log file {}: {}", path.display(), e))?;

      let (writer, guard) = tracing_appender::non_blocking(file);
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

      Ok(Some(guard))
    }
    None => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

      Ok(None)
    }
  }
}
