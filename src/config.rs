//! Configuration Module
//!
//! Eviction strategies, per-cache configuration and server settings loaded
//! from environment variables.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default capacity of an LRU cache.
pub const DEFAULT_CAPACITY: usize = 128;

// == Strategy ==
/// Eviction strategy, fixed when a cache is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Never evicts; grows until explicitly invalidated.
    Unbounded,
    /// Evicts the least recently used entry once `capacity` keys are held.
    Lru { capacity: usize },
    /// Entries older than `ttl` are treated as absent and purged lazily.
    Timed { ttl: Duration },
}

impl Strategy {
    /// Rejects non-positive capacities and TTLs.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Strategy::Unbounded => Ok(()),
            Strategy::Lru { capacity } if capacity == 0 => Err(CacheError::InvalidConfig(
                "lru capacity must be positive".to_string(),
            )),
            Strategy::Timed { ttl } if ttl.is_zero() => Err(CacheError::InvalidConfig(
                "ttl must be positive".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Builds a strategy from its name and the overloaded size parameter:
    /// capacity for `lru`, seconds for `timed`, ignored for `raw`.
    pub fn parse(name: &str, size: Option<&str>) -> Result<Self> {
        let strategy = match name.trim().to_ascii_lowercase().as_str() {
            "raw" | "unbounded" => Strategy::Unbounded,
            "lru" => {
                let capacity = match size {
                    Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                        CacheError::InvalidConfig(format!("invalid lru capacity: {raw}"))
                    })?,
                    None => DEFAULT_CAPACITY,
                };
                Strategy::Lru { capacity }
            }
            "timed" | "ttl" => {
                let raw = size.ok_or_else(|| {
                    CacheError::InvalidConfig("timed strategy requires a ttl".to_string())
                })?;
                let seconds = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| CacheError::InvalidConfig(format!("invalid ttl: {raw}")))?;
                let ttl = Duration::try_from_secs_f64(seconds)
                    .map_err(|_| CacheError::InvalidConfig(format!("invalid ttl: {raw}")))?;
                Strategy::Timed { ttl }
            }
            other => {
                return Err(CacheError::InvalidConfig(format!(
                    "unknown strategy: {other}"
                )))
            }
        };

        strategy.validate()?;
        Ok(strategy)
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Lru {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Unbounded => write!(f, "raw"),
            Strategy::Lru { capacity } => write!(f, "lru({capacity})"),
            Strategy::Timed { ttl } => write!(f, "timed({}s)", ttl.as_secs_f64()),
        }
    }
}

// == Cache Config ==
/// Configuration of a single memoisation cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Eviction strategy
    pub strategy: Strategy,
    /// Leave every named argument out of derived keys
    pub ignore_named_args: bool,
}

impl CacheConfig {
    /// Loads a cache configuration from `<PREFIX>_STRATEGY`, `<PREFIX>_SIZE`
    /// and `<PREFIX>_IGNORE_NAMED`.
    ///
    /// Unset variables fall back to defaults; malformed ones are errors.
    pub fn from_env(prefix: &str) -> Result<Self> {
        let size = env::var(format!("{prefix}_SIZE")).ok();
        let strategy = match env::var(format!("{prefix}_STRATEGY")) {
            Ok(name) => Strategy::parse(&name, size.as_deref())?,
            Err(_) => match size {
                Some(raw) => Strategy::parse("lru", Some(&raw))?,
                None => Strategy::default(),
            },
        };

        let ignore_named_args = match env::var(format!("{prefix}_IGNORE_NAMED")) {
            Ok(raw) => parse_bool(&raw)?,
            Err(_) => false,
        };

        Ok(Self {
            strategy,
            ignore_named_args,
        })
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CacheError::InvalidConfig(format!("invalid boolean: {other}"))),
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CacheError::InvalidConfig(format!("invalid {name}: {raw}"))),
        Err(_) => Ok(default),
    }
}

// == Server Config ==
/// Settings for the inspection server binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Interval in seconds between stats reports
    pub stats_interval: u64,
    /// Simulated upstream latency of the demo lookup, in milliseconds
    pub lookup_delay_ms: u64,
    /// Configuration of the demo lookup cache
    pub lookup_cache: CacheConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `STATS_INTERVAL` - Stats report frequency in seconds (default: 60)
    /// - `LOOKUP_DELAY_MS` - Simulated lookup latency (default: 250)
    /// - `LOOKUP_CACHE_STRATEGY` / `LOOKUP_CACHE_SIZE` / `LOOKUP_CACHE_IGNORE_NAMED`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            server_port: parse_or("SERVER_PORT", defaults.server_port)?,
            stats_interval: parse_or("STATS_INTERVAL", defaults.stats_interval)?,
            lookup_delay_ms: parse_or("LOOKUP_DELAY_MS", defaults.lookup_delay_ms)?,
            lookup_cache: CacheConfig::from_env("LOOKUP_CACHE")?,
        };

        if config.stats_interval == 0 {
            return Err(CacheError::InvalidConfig(
                "STATS_INTERVAL must be positive".to_string(),
            ));
        }
        Ok(config)
    }

    /// Simulated lookup latency as a Duration.
    pub fn lookup_delay(&self) -> Duration {
        Duration::from_millis(self.lookup_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            stats_interval: 60,
            lookup_delay_ms: 250,
            lookup_cache: CacheConfig::default(),
        }
    }
}
