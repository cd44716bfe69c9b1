use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsroll::aggregator::{start_background_refresh, Aggregator, Newsroom};
use newsroll::config::Config;
use newsroll::fetcher::Fetcher;
use newsroll::routes::{self, AppState};
use newsroll::sources::SourceRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsroll=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("NEWSROLL_CONFIG").unwrap_or_else(|_| "feeds.toml".to_string());
    let config = Config::load(&config_path)?;
    info!("Loaded {} sources from {}", config.sources.len(), config_path);

    let registry = Arc::new(SourceRegistry::from_config(&config.sources));
    let fetcher = Fetcher::new(
        config.upstream.clone(),
        registry,
        Duration::from_secs(config.request_timeout),
    )?;
    let newsroom = Arc::new(Newsroom::new(Aggregator::new(Arc::new(fetcher))));

    // First pass at startup, then periodic refreshes
    let bg_newsroom = newsroom.clone();
    let refresh_interval = config.refresh_interval;
    tokio::spawn(async move {
        start_background_refresh(bg_newsroom, refresh_interval).await;
    });

    let state = Arc::new(AppState { newsroom });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("Server starting on http://{}", config.listen);

    axum::serve(listener, app).await?;

    Ok(())
}
