use std::cmp::Reverse;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::RwLock;
use tokio::task::JoinError;
use tracing::{error, info};
use url::Url;

use crate::article::Article;
use crate::error::AggregateError;
use crate::fetcher::Fetcher;
use crate::filter::Filter;
use crate::render::{render, ArticleList};
use crate::sources::{Source, SourceRegistry};

/// Fans the fetcher out over every registered source.
pub struct Aggregator {
    fetcher: Arc<Fetcher>,
}

impl Aggregator {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    pub fn registry(&self) -> &SourceRegistry {
        self.fetcher.registry()
    }

    /// Fetch all sources concurrently and merge them, newest first.
    ///
    /// Every source runs to completion on its own task; a failing or panicking
    /// source only loses its own articles.
    pub async fn collect(&self) -> Result<Vec<Article>, AggregateError> {
        let endpoint = self.fetcher.endpoint();
        Url::parse(endpoint).map_err(|source| AggregateError::Endpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let sources: Vec<_> = self.registry().iter().cloned().collect();
        let tasks = sources.iter().map(|source| {
            let fetcher = self.fetcher.clone();
            let source = source.clone();
            tokio::spawn(async move { fetcher.fetch(&source.id, &source.url).await })
        });

        Ok(merge(&sources, join_all(tasks).await))
    }
}

/// Concatenate every finished source's articles, newest first. A task that
/// panicked or was cancelled contributes nothing.
fn merge(sources: &[Source], outcomes: Vec<Result<Vec<Article>, JoinError>>) -> Vec<Article> {
    let mut articles = Vec::new();
    for (source, outcome) in sources.iter().zip(outcomes) {
        match outcome {
            Ok(batch) => articles.extend(batch),
            Err(e) => error!("Fetch task for '{}' did not finish: {}", source.id, e),
        }
    }

    sort_newest_first(&mut articles);
    articles
}

/// Undated articles go last.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by_cached_key(|a| Reverse(a.published()));
}

/// Shared application state: the last merged collection and the active filter.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub articles: Arc<Vec<Article>>,
    pub filter: Filter,
    /// Set when the last finished pass produced nothing to show
    pub failed: bool,
}

/// Counts an in-flight aggregation pass for as long as it is alive.
struct PassGuard(Arc<AtomicUsize>);

impl PassGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Owns the aggregation passes and the state the renderer reads from.
pub struct Newsroom {
    aggregator: Aggregator,
    state: RwLock<Snapshot>,
    in_flight: Arc<AtomicUsize>,
}

impl Newsroom {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator,
            state: RwLock::new(Snapshot::default()),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        self.aggregator.registry()
    }

    /// True while any aggregation pass is running.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.clone()
    }

    /// Run one aggregation pass and replace the collection. Returns the article count.
    pub async fn load_all(&self) -> usize {
        let _guard = PassGuard::enter(&self.in_flight);
        self.run_pass().await
    }

    /// Start a pass in the background. The loading flag is raised before this returns.
    pub fn spawn_load_all(self: &Arc<Self>) -> tokio::task::JoinHandle<usize> {
        let guard = PassGuard::enter(&self.in_flight);
        let newsroom = self.clone();
        tokio::spawn(async move {
            let count = newsroom.run_pass().await;
            drop(guard);
            count
        })
    }

    async fn run_pass(&self) -> usize {
        {
            let mut state = self.state.write().await;
            state.articles = Arc::new(Vec::new());
            state.failed = false;
        }

        info!(
            "Starting aggregation pass over {} sources",
            self.registry().len()
        );

        let articles = match self.aggregator.collect().await {
            Ok(articles) => articles,
            Err(e) => {
                error!("Error loading feeds: {}", e);
                Vec::new()
            }
        };

        let count = articles.len();
        {
            let mut state = self.state.write().await;
            state.failed = articles.is_empty();
            state.articles = Arc::new(articles);
        }

        info!("Aggregation pass complete: {} articles", count);
        count
    }

    /// Select a filter and re-render from the loaded collection.
    pub async fn set_filter(&self, filter: Filter, now: DateTime<Utc>) -> Option<ArticleList> {
        let mut state = self.state.write().await;
        state.filter = filter;
        render_snapshot(&state, now)
    }

    /// Current content region, `None` while there is nothing loaded.
    pub async fn render_current(&self, now: DateTime<Utc>) -> Option<ArticleList> {
        let state = self.state.read().await;
        render_snapshot(&state, now)
    }
}

fn render_snapshot(state: &Snapshot, now: DateTime<Utc>) -> Option<ArticleList> {
    if state.articles.is_empty() {
        None
    } else {
        Some(render(&state.articles, &state.filter, now))
    }
}

/// Run a pass at startup, then every `interval_minutes` if non-zero.
pub async fn start_background_refresh(newsroom: Arc<Newsroom>, interval_minutes: u64) {
    info!("Starting initial feed fetch");
    newsroom.load_all().await;

    if interval_minutes == 0 {
        return;
    }

    let interval = Duration::from_secs(interval_minutes * 60);
    loop {
        tokio::time::sleep(interval).await;
        info!("Starting scheduled feed refresh");
        newsroom.load_all().await;
    }
}
