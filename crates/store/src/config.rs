use resolver::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base URL used when nothing else is configured.
pub const DEFAULT_WEAVIATE_URL: &str = "http://localhost:8080";

/// Environment variable that overrides the configured base URL.
pub const WEAVIATE_URL_ENV: &str = "WEAVIATE_URL";

/// Connection settings for a Weaviate instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaviateConfig {
    /// Base URL, e.g. `http://localhost:8080`. A trailing slash is ignored.
    #[serde(default = "default_url")]
    pub url: String,

    /// Class holding the card records.
    #[serde(default = "default_class_name")]
    pub class_name: String,

    /// Whole-request timeout for every HTTP call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for WeaviateConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            class_name: default_class_name(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl WeaviateConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Apply `WEAVIATE_URL` when it is set and non-blank.
    pub fn with_env_override(mut self) -> Self {
        if let Ok(url) = std::env::var(WEAVIATE_URL_ENV) {
            if !url.trim().is_empty() {
                self.url = url.trim().to_string();
            }
        }
        self
    }

    pub fn base_url(&self) -> &str {
        self.url.trim().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> StoreResult<()> {
        let base = self.base_url();
        if base.is_empty() {
            return Err(StoreError::Config("weaviate url must not be empty".into()));
        }
        let parsed = reqwest::Url::parse(base)
            .map_err(|e| StoreError::Config(format!("invalid weaviate url '{base}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StoreError::Config(format!(
                "weaviate url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        // The class name is interpolated into GraphQL, so keep it to identifier characters.
        let mut chars = self.class_name.chars();
        let valid_class = chars.next().is_some_and(|c| c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_class {
            return Err(StoreError::Config(format!(
                "invalid class name '{}'",
                self.class_name
            )));
        }

        if self.timeout_secs == 0 {
            return Err(StoreError::Config("timeout_secs must be greater than zero".into()));
        }
        if self.connect_timeout_secs == 0 {
            return Err(StoreError::Config(
                "connect_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn default_url() -> String {
    DEFAULT_WEAVIATE_URL.to_string()
}

fn default_class_name() -> String {
    "Card".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_connect_timeout_secs() -> u64 {
    5
}
