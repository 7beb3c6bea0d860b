use resolver::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use store::WeaviateConfig;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Vector store connection
    #[serde(default)]
    pub weaviate: WeaviateConfig,

    /// Similarity pipeline knobs
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            weaviate: WeaviateConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `cardsim.{toml,yaml,json}`
    /// file and `CARDSIM__*` environment variables, in that order of precedence
    /// (later wins). `WEAVIATE_URL` overrides the store URL last.
    pub fn load() -> anyhow::Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("cardsim").required(false))
            .add_source(config::Environment::with_prefix("CARDSIM").separator("__"));

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;
        config.weaviate = config.weaviate.with_env_override();
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        if self.max_body_size_mb == 0 {
            anyhow::bail!("max_body_size_mb must be greater than zero");
        }
        self.weaviate.validate()?;
        self.resolver.validate()?;
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8088
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_max_body_size_mb() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8088);
        assert_eq!(cfg.timeout_secs, 20);
        assert_eq!(cfg.max_body_size(), 1024 * 1024);
        assert!(cfg.enable_cors);
        assert!(cfg.metrics_enabled);
        assert_eq!(cfg.resolver.default_k, 10);
        assert_eq!(cfg.weaviate.class_name, "Card");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8088);
    }

    #[test]
    fn test_nested_sections_deserialize() {
        let cfg: ServerConfig = serde_json::from_value(serde_json::json!({
            "port": 9000,
            "weaviate": { "url": "http://weaviate:8080" },
            "resolver": { "max_k": 50 }
        }))
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.weaviate.base_url(), "http://weaviate:8080");
        assert_eq!(cfg.weaviate.timeout_secs, 15);
        assert_eq!(cfg.resolver.max_k, 50);
        assert_eq!(cfg.resolver.default_k, 10);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = ServerConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let mut cfg = ServerConfig::default();
        cfg.weaviate.url = "not a url".into();
        assert!(cfg.validate().is_err());
    }
}
