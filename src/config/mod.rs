#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::form::DEFAULT_ENDPOINT;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::collections::BTreeMap;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Connection settings after defaults, the config file and flags are layered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub headers: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: None,
            headers: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn merge_toml(mut self, file: &TomlConfig) -> Self {
        if let Some(base_url) = &file.server.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(endpoint) = &file.server.endpoint {
            self.endpoint = endpoint.clone();
        }
        if file.server.timeout_seconds.is_some() {
            self.timeout_seconds = file.server.timeout_seconds;
        }
        self.headers
            .extend(file.headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }
}

impl ConfigProvider for Settings {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_endpoint_path("endpoint", &self.endpoint)?;
        if let Some(timeout) = self.timeout_seconds {
            validation::validate_positive_number("timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}
