use crate::{
    fetch::FetchOptions,
    retry::{RetryPolicy, DEFAULT_BACKOFF_FACTOR, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_RETRIES},
};
use eyre::Context as _;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path, time::Duration};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Retries after the first attempt when fetching a remote spec.
    pub max_retries: u32,
    /// Sleep before the first retry (milliseconds).
    pub initial_delay_ms: u64,
    /// Multiplier applied to the sleep after every failed attempt.
    pub backoff_factor: f64,
    /// Optional per-attempt timeout (seconds). Unset means the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Connect directly even when proxy environment variables are set.
    pub no_proxy: bool,
    /// Extra request headers, e.g. an auth token for private spec hosts.
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay_ms: u64::try_from(DEFAULT_INITIAL_DELAY.as_millis()).unwrap_or(1000),
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            timeout_seconds: None,
            user_agent: None,
            no_proxy: false,
            headers: BTreeMap::new(),
        }
    }
}

impl FetchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            backoff_factor: self.backoff_factor,
        }
    }

    pub fn fetch_options(&self) -> eyre::Result<FetchOptions> {
        let mut headers = HeaderMap::new();
        for (k, v) in &self.headers {
            let name = HeaderName::from_bytes(k.as_bytes())
                .with_context(|| format!("invalid header name: {k}"))?;
            let value =
                HeaderValue::from_str(v).with_context(|| format!("invalid value for header {k}"))?;
            headers.insert(name, value);
        }
        Ok(FetchOptions {
            headers,
            timeout: self.timeout_seconds.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
            no_proxy: self.no_proxy,
            ..FetchOptions::default()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecConfig {
    pub fetch: FetchConfig,
}

impl SpecConfig {
    pub fn from_toml_str(s: &str) -> eyre::Result<Self> {
        toml::from_str(s).context("parse config toml")
    }

    pub fn load(path: &Path) -> eyre::Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_toml_str(&s).with_context(|| format!("load {}", path.display()))
    }
}
