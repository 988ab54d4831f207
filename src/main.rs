//! TTL Cache - line-oriented host for an in-process cache
//!
//! Reads one command per line from stdin and answers on stdout:
//!
//! ```text
//! GET <key>
//! ADD <key> <ttl> <json-value>
//! FLUSH | STATS | PURGE | LEN
//! ```

use anyhow::Context;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::{Backend, Cache, CacheConfig, FileBackend, MemoryBackend};

/// A parsed stdin command.
#[derive(Debug, PartialEq)]
enum Command {
    Get(String),
    Add { key: String, ttl: String, value: Value },
    Flush,
    Stats,
    Purge,
    Len,
}

/// Splits off the first whitespace-delimited word, returning it and the rest.
fn next_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(end) => (&input[..end], &input[end..]),
        None => (input, ""),
    }
}

impl Command {
    fn parse(line: &str) -> Result<Self, String> {
        let (verb, rest) = next_word(line);

        match verb.to_ascii_uppercase().as_str() {
            "GET" => match next_word(rest).0 {
                "" => Err("usage: GET <key>".to_string()),
                key => Ok(Command::Get(key.to_string())),
            },
            "ADD" => {
                let (key, rest) = next_word(rest);
                let (ttl, rest) = next_word(rest);
                let raw = rest.trim();
                if key.is_empty() || ttl.is_empty() || raw.is_empty() {
                    return Err("usage: ADD <key> <ttl> <json-value>".to_string());
                }
                let value = serde_json::from_str(raw).map_err(|e| format!("bad value: {e}"))?;
                Ok(Command::Add {
                    key: key.to_string(),
                    ttl: ttl.to_string(),
                    value,
                })
            }
            "FLUSH" => Ok(Command::Flush),
            "STATS" => Ok(Command::Stats),
            "PURGE" => Ok(Command::Purge),
            "LEN" => Ok(Command::Len),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

fn execute<B: Backend<Value = Value>>(cache: &Cache<B>, command: Command) -> String {
    match command {
        Command::Get(key) => match cache.get(&key) {
            Ok(value) => value.to_string(),
            Err(_) => "MISS".to_string(),
        },
        Command::Add { key, ttl, value } => match cache.add(key, value, &ttl) {
            Ok(()) => "OK".to_string(),
            Err(e) => format!("ERR {e}"),
        },
        Command::Flush => match cache.flush() {
            Ok(()) => "OK".to_string(),
            Err(e) => format!("ERR {e}"),
        },
        Command::Stats => {
            serde_json::to_string(&cache.stats()).unwrap_or_else(|e| format!("ERR {e}"))
        }
        Command::Purge => format!("PURGED {}", cache.purge_expired()),
        Command::Len => cache.len().to_string(),
    }
}

/// Serves stdin until EOF or Ctrl+C, then closes the cache.
async fn serve<B: Backend<Value = Value>>(cache: Cache<B>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    info!("stdin closed, shutting down");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let reply = match Command::parse(&line) {
                    Ok(command) => execute(&cache, command),
                    Err(e) => format!("ERR {e}"),
                };
                println!("{reply}");
            }
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, initiating shutdown...");
                break;
            }
        }
    }

    if let Err(e) = cache.close() {
        warn!("Final flush failed: {}", e);
        return Err(e).context("failed to flush cache on shutdown");
    }
    info!("Cache closed");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only replies.
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: default_ttl={:?}, janitor_interval={:?}, path={:?}",
        config.default_ttl, config.janitor_interval, config.persist_path
    );

    match config.persist_path.clone() {
        Some(path) => serve(Cache::with_config(FileBackend::open(path), &config)).await,
        None => serve(Cache::with_config(MemoryBackend::new(), &config)).await,
    }
}
