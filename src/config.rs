//! Application configuration.
//!
//! Values come from `COGFLOW_*` environment variables with sensible
//! defaults; builder methods override individual fields in code. The library
//! itself never reads configuration — flows are wired explicitly — so this
//! lives at the application boundary, next to the binaries.

use std::time::Duration;

use thiserror::Error;

/// A configuration value that could not be interpreted.
#[derive(Debug, Error)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: String,
    pub value: String,
    pub reason: String,
}

impl ConfigError {
    fn new(key: &str, value: &str, reason: impl ToString) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Settings for an application built on the engine.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-item retry budget for units.
    pub max_retries: usize,
    /// Worker pool size for fan-out units.
    pub workers: usize,
    /// Minimum spacing between provider requests, if any.
    pub request_interval: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: "mock-chat-v1".to_string(),
            temperature: 0.7,
            max_retries: 2,
            workers: num_cpus::get(),
            request_interval: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `COGFLOW_*` environment variables.
    ///
    /// Unset variables keep their defaults; set-but-invalid values are an
    /// error rather than a silent fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(model) = lookup("COGFLOW_MODEL") {
            config.model = model;
        }
        if let Some(raw) = lookup("COGFLOW_TEMPERATURE") {
            config.temperature = raw
                .parse()
                .map_err(|e| ConfigError::new("COGFLOW_TEMPERATURE", &raw, e))?;
        }
        if let Some(raw) = lookup("COGFLOW_MAX_RETRIES") {
            config.max_retries = raw
                .parse()
                .map_err(|e| ConfigError::new("COGFLOW_MAX_RETRIES", &raw, e))?;
        }
        if let Some(raw) = lookup("COGFLOW_WORKERS") {
            let workers: usize = raw
                .parse()
                .map_err(|e| ConfigError::new("COGFLOW_WORKERS", &raw, e))?;
            config.workers = workers.max(1);
        }
        if let Some(raw) = lookup("COGFLOW_REQUEST_INTERVAL") {
            let interval = humantime::parse_duration(&raw)
                .map_err(|e| ConfigError::new("COGFLOW_REQUEST_INTERVAL", &raw, e))?;
            config.request_interval = Some(interval);
        }

        Ok(config)
    }

    /// Override the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the retry budget.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the worker count, clamped to at least one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Override the request pacing interval.
    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = Some(interval);
        self
    }
}
