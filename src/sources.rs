//! Static registry of the configured news sources.

use crate::config::SourceConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub id: String,
    pub url: String,
    pub name: String,
}

impl From<&SourceConfig> for Source {
    fn from(config: &SourceConfig) -> Self {
        Self {
            id: config.id.clone(),
            url: config.url.clone(),
            name: config.name.clone(),
        }
    }
}

/// Ordered, immutable set of sources. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<Source>) -> Self {
        Self { sources }
    }

    pub fn from_config(configs: &[SourceConfig]) -> Self {
        Self::new(configs.iter().map(Source::from).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Human-readable name for a source id, falling back to the uppercased id.
    pub fn display_name(&self, id: &str) -> String {
        self.get(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_uppercase())
    }
}
