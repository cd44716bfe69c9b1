use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::article::{excerpt, Article};
use crate::config::UpstreamConfig;
use crate::error::FetchError;
use crate::sources::SourceRegistry;

/// Body returned by the RSS-to-JSON conversion service.
#[derive(Debug, Deserialize)]
struct FeedResponse {
    status: Option<String>,
    items: Option<Vec<Value>>,
}

/// One converted feed item. Items are decoded individually so that a bad one
/// doesn't take the rest of its feed down with it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedItem {
    title: Option<String>,
    link: Option<String>,
    pub_date: Option<String>,
    description: Option<String>,
    content: Option<String>,
    thumbnail: Option<String>,
    // Sometimes an object, sometimes an empty array
    enclosure: Option<Value>,
}

impl FeedItem {
    fn into_article(self, source: &str, source_name: &str) -> Article {
        let body = non_empty(self.description)
            .or_else(|| non_empty(self.content))
            .unwrap_or_default();

        let enclosure_link = self
            .enclosure
            .as_ref()
            .and_then(|e| e.get("link"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let thumbnail = non_empty(self.thumbnail)
            .or_else(|| non_empty(enclosure_link))
            .unwrap_or_default();

        Article {
            source: source.to_string(),
            source_name: source_name.to_string(),
            title: self.title.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            pub_date: self.pub_date.unwrap_or_default(),
            description: excerpt(&body),
            thumbnail,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub struct Fetcher {
    client: Client,
    upstream: UpstreamConfig,
    registry: Arc<SourceRegistry>,
}

impl Fetcher {
    pub fn new(
        upstream: UpstreamConfig,
        registry: Arc<SourceRegistry>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Newsroll/1.0 (RSS Aggregator)")
            .build()?;

        Ok(Self {
            client,
            upstream,
            registry,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.upstream.endpoint
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Fetch and normalize one source. Any failure is logged and yields no articles.
    pub async fn fetch(&self, source: &str, url: &str) -> Vec<Article> {
        match self.try_fetch(source, url).await {
            Ok(articles) => articles,
            Err(e) => {
                error!("Error fetching {}: {}", source, e);
                Vec::new()
            }
        }
    }

    pub async fn try_fetch(&self, source: &str, url: &str) -> Result<Vec<Article>, FetchError> {
        info!("Fetching feed: {} ({})", source, url);

        let count = self.upstream.count.to_string();
        let response = self
            .client
            .get(&self.upstream.endpoint)
            .query(&[
                ("rss_url", url),
                ("api_key", self.upstream.api_key.as_str()),
                ("count", count.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport { status });
        }

        let bytes = response.bytes().await?;
        let body: FeedResponse = serde_json::from_slice(&bytes)?;

        let articles = self.normalize(source, body);
        info!("Got {} articles from '{}'", articles.len(), source);
        Ok(articles)
    }

    fn normalize(&self, source: &str, response: FeedResponse) -> Vec<Article> {
        if response.status.as_deref() != Some("ok") {
            debug!(
                "Upstream reported status {:?} for '{}'",
                response.status, source
            );
            return Vec::new();
        }

        let items = match response.items {
            Some(items) if !items.is_empty() => items,
            _ => {
                debug!("No items for '{}'", source);
                return Vec::new();
            }
        };

        let source_name = self.registry.display_name(source);
        items
            .into_iter()
            .enumerate()
            .filter_map(|(index, raw)| match serde_json::from_value::<FeedItem>(raw) {
                Ok(item) => Some(item.into_article(source, &source_name)),
                Err(e) => {
                    warn!("Skipping malformed item #{} from '{}': {}", index, source, e);
                    None
                }
            })
            .collect()
    }
}
