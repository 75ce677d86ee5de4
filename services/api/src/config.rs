//! API service configuration

use anyhow::Result;
use serde::Deserialize;

/// Listener and paging settings, read from `API_*` variables
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound applied to the `limit` query parameter
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_max_page_size() -> u32 {
    100
}

impl ApiConfig {
    /// Load from `API_HOST`, `API_PORT` and `API_MAX_PAGE_SIZE`
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?;

        let config: ApiConfig = settings.try_deserialize()?;
        if config.max_page_size == 0 {
            anyhow::bail!("API_MAX_PAGE_SIZE must be greater than zero");
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
