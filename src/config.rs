/// Runtime tunables for the content script and background contexts
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;
use wasm_bindgen::JsValue;

use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5050/analyze";
pub const DEFAULT_COMMENT_SELECTOR: &str = "ul span[dir='auto']";

/// Every field has a default, so a partial object from JS is accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub endpoint: String,
    pub comment_selector: String,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            comment_selector: DEFAULT_COMMENT_SELECTOR.to_string(),
            max_attempts: 5,
            retry_delay_ms: 800,
            poll_interval_ms: 1500,
            settle_delay_ms: 2000,
            request_timeout_ms: 10_000,
        }
    }
}

impl Config {
    /// Decode an optional config object handed over from JS
    pub fn from_js(value: JsValue) -> Result<Config, ConfigError> {
        if value.is_undefined() || value.is_null() {
            return Ok(Config::default());
        }

        let config: Config = serde_wasm_bindgen::from_value(value)
            .map_err(|e| ConfigError::Decode(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint_error = |reason: &str| ConfigError::Endpoint {
            endpoint: self.endpoint.clone(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(&self.endpoint).map_err(|e| endpoint_error(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(endpoint_error("scheme must be http or https"));
        }

        if self.comment_selector.trim().is_empty() {
            return Err(ConfigError::EmptySelector);
        }

        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
