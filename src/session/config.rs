//! Launch configuration helpers.
//!
//! The config file is optional; a session without one runs on defaults and
//! takes its webhook URL from the flag or the environment.
use super::{write_atomic, SessionPaths};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Environment variable carrying the workflow webhook URL.
pub const WEBHOOK_URL_ENV: &str = "INTEL_WEBHOOK_URL";

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_RETRIES: usize = 2;
const DEFAULT_RETRY_DELAY_MS: u64 = 500;
const DEFAULT_PROGRESS_MS: u64 = 3_000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_max_retries() -> usize {
    DEFAULT_MAX_RETRIES
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

fn default_progress_ms() -> u64 {
    DEFAULT_PROGRESS_MS
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LaunchConfig {
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Overrides the dataset company in dispatched payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Total duration of the simulated progress display; 0 skips the delay.
    #[serde(default = "default_progress_ms")]
    pub progress_ms: u64,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        default_config()
    }
}

/// Build the config written by `init`.
pub fn default_config() -> LaunchConfig {
    LaunchConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        webhook_url: None,
        company_id: None,
        timeout_ms: DEFAULT_TIMEOUT_MS,
        max_retries: DEFAULT_MAX_RETRIES,
        retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        progress_ms: DEFAULT_PROGRESS_MS,
    }
}

/// Load `config.json`, failing when it is missing.
pub fn load_config(paths: &SessionPaths) -> Result<LaunchConfig> {
    let path = paths.config_path();
    let bytes = fs::read(&path).with_context(|| format!("read config {}", path.display()))?;
    let config: LaunchConfig =
        serde_json::from_slice(&bytes).context("parse launch config JSON")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load `config.json` when present, defaults otherwise.
pub fn load_config_optional(paths: &SessionPaths) -> Result<LaunchConfig> {
    if !paths.config_path().is_file() {
        return Ok(default_config());
    }
    load_config(paths)
}

/// Persist a config in a stable JSON format.
pub fn write_config(paths: &SessionPaths, config: &LaunchConfig) -> Result<()> {
    let text = serde_json::to_string_pretty(config).context("serialize launch config")?;
    write_atomic(&paths.config_path(), text.as_bytes())
}

pub fn validate_config(config: &LaunchConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported launch config schema_version {}",
            config.schema_version
        ));
    }
    if config.timeout_ms == 0 {
        return Err(anyhow!("timeout_ms must be greater than zero"));
    }
    if let Some(url) = config.webhook_url.as_deref() {
        validate_webhook_url(url).context("config webhook_url")?;
    }
    if let Some(company_id) = config.company_id.as_deref() {
        if company_id.trim().is_empty() {
            return Err(anyhow!("company_id must be non-empty when set"));
        }
    }
    Ok(())
}

/// Resolve the webhook URL: flag, then environment, then config.
pub fn resolve_webhook_url(
    flag: Option<&str>,
    env_value: Option<&str>,
    config: &LaunchConfig,
) -> Result<String> {
    let candidates = [
        (flag, "--webhook-url"),
        (env_value, WEBHOOK_URL_ENV),
        (config.webhook_url.as_deref(), "config webhook_url"),
    ];
    for (value, label) in candidates {
        let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
            continue;
        };
        validate_webhook_url(value).with_context(|| format!("invalid {label}"))?;
        return Ok(value.to_string());
    }
    Err(anyhow!(
        "no webhook URL configured; pass --webhook-url, set {WEBHOOK_URL_ENV}, or add webhook_url to config.json"
    ))
}

fn validate_webhook_url(url: &str) -> Result<()> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| anyhow!("webhook URL must start with http:// or https:// (got {url:?})"))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() {
        return Err(anyhow!("webhook URL has no host (got {url:?})"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
