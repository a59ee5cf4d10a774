//! Projector and worker configuration.
//!
//! Values come either from serde (embedding application's own config file) or
//! from environment variables:
//!
//! - `CQRSKIT_PROJECTOR_STREAM` (required)
//! - `CQRSKIT_PROJECTOR_PAGE_SIZE` (default 100)
//! - `CQRSKIT_WORKER_NAME` (default `"catch-up"`)
//! - `CQRSKIT_WORKER_INTERVAL_MS` (default 1000)

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use cqrskit_core::StreamName;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_WORKER_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Which stream a projector reads and how many records per page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectorConfig {
    pub stream: StreamName,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl ProjectorConfig {
    pub fn new(stream: StreamName) -> Self {
        Self {
            stream,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                var: "page_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        const STREAM: &str = "CQRSKIT_PROJECTOR_STREAM";
        const PAGE_SIZE: &str = "CQRSKIT_PROJECTOR_PAGE_SIZE";

        let raw = lookup(STREAM).ok_or(ConfigError::Missing(STREAM))?;
        let stream = StreamName::new(&raw).map_err(|e| ConfigError::Invalid {
            var: STREAM,
            reason: e.to_string(),
        })?;

        let page_size = match lookup(PAGE_SIZE) {
            Some(v) => v.trim().parse::<usize>().map_err(|e| ConfigError::Invalid {
                var: PAGE_SIZE,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PAGE_SIZE,
        };

        let cfg = Self { stream, page_size };
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Background catch-up worker settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Thread name, also used as the `worker` log field.
    pub name: String,
    /// Pause between two catch-up passes.
    pub interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: "catch-up".to_string(),
            interval: DEFAULT_WORKER_INTERVAL,
        }
    }
}

impl WorkerConfig {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        const NAME: &str = "CQRSKIT_WORKER_NAME";
        const INTERVAL: &str = "CQRSKIT_WORKER_INTERVAL_MS";

        let mut cfg = Self::default();
        if let Some(name) = lookup(NAME).filter(|n| !n.trim().is_empty()) {
            cfg.name = name;
        }
        if let Some(ms) = lookup(INTERVAL) {
            let ms = ms.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: INTERVAL,
                reason: e.to_string(),
            })?;
            cfg.interval = Duration::from_millis(ms);
        }
        Ok(cfg)
    }
}
