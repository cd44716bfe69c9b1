use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Address the web server binds to
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Refresh interval in minutes, 0 disables periodic refresh
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    pub sources: Vec<SourceConfig>,
}

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_refresh_interval() -> u64 {
    15
}

fn default_request_timeout() -> u64 {
    30
}

/// The RSS-to-JSON conversion service every feed is fetched through.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct UpstreamConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Maximum number of items requested per feed
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_endpoint() -> String {
    "https://api.rss2json.com/v1/api.json".to_string()
}

fn default_api_key() -> String {
    "public".to_string()
}

fn default_count() -> u32 {
    20
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: default_api_key(),
            count: default_count(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SourceConfig {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.id.trim().is_empty() {
                anyhow::bail!("source '{}' has an empty id", source.name);
            }
            if !seen.insert(source.id.as_str()) {
                anyhow::bail!("duplicate source id '{}'", source.id);
            }
        }
        Ok(())
    }
}
