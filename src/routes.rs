use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::aggregator::Newsroom;
use crate::filter::{Filter, ALL};
use crate::render::ArticleList;

pub struct AppState {
    pub newsroom: Arc<Newsroom>,
}

// Template structs
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub filters: Vec<FilterControl>,
    pub indicators: String,
    pub refresh: String,
    pub content: String,
}

pub struct FilterControl {
    pub value: String,
    pub label: String,
    pub active: bool,
}

/// Loading and error regions. With `oob` set they ride along on fragment
/// responses and replace the page's copies out of band.
#[derive(Template)]
#[template(path = "indicators.html")]
pub struct IndicatorsTemplate {
    pub loading: bool,
    pub failed: bool,
    pub oob: bool,
}

#[derive(Template)]
#[template(path = "refresh_button.html")]
pub struct RefreshButtonTemplate {
    pub refreshing: bool,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

// Custom error type
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong".to_string(),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/articles", get(articles))
        .route("/filter", post(set_filter))
        .route("/refresh", post(refresh))
        .route("/refresh/status", get(refresh_status))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn render_content(list: Option<ArticleList>) -> Result<String, AppError> {
    match list {
        Some(list) => Ok(list.render()?),
        None => Ok(String::new()),
    }
}

async fn indicators(newsroom: &Newsroom, oob: bool) -> IndicatorsTemplate {
    let loading = newsroom.is_loading();
    let failed = newsroom.snapshot().await.failed;
    IndicatorsTemplate {
        loading,
        failed: failed && !loading,
        oob,
    }
}

/// Content region plus out-of-band indicator state.
async fn content_fragment(
    newsroom: &Newsroom,
    list: Option<ArticleList>,
) -> Result<Html<String>, AppError> {
    let content = render_content(list)?;
    let indicators = indicators(newsroom, true).await.render()?;
    Ok(Html(content + &indicators))
}

fn filter_controls(newsroom: &Newsroom, active: &Filter) -> Vec<FilterControl> {
    let all = FilterControl {
        value: ALL.to_string(),
        label: "All Sources".to_string(),
        active: *active == Filter::All,
    };

    std::iter::once(all)
        .chain(newsroom.registry().iter().map(|source| FilterControl {
            value: source.id.clone(),
            label: newsroom.registry().display_name(&source.id),
            active: active.as_str() == source.id,
        }))
        .collect()
}

// Route handlers
pub async fn index(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let newsroom = &state.newsroom;
    let snapshot = newsroom.snapshot().await;
    let content = render_content(newsroom.render_current(Utc::now()).await)?;
    let indicators = indicators(newsroom, false).await;

    let refresh = RefreshButtonTemplate {
        refreshing: indicators.loading,
    }
    .render()?;

    Ok(HtmlTemplate(IndexTemplate {
        filters: filter_controls(newsroom, &snapshot.filter),
        indicators: indicators.render()?,
        refresh,
        content,
    }))
}

pub async fn articles(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let list = state.newsroom.render_current(Utc::now()).await;
    content_fragment(&state.newsroom, list).await
}

#[derive(Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub source: String,
}

pub async fn set_filter(
    State(state): State<Arc<AppState>>,
    Form(form): Form<FilterForm>,
) -> Result<impl IntoResponse, AppError> {
    let filter = Filter::parse(&form.source);
    let list = state.newsroom.set_filter(filter, Utc::now()).await;
    content_fragment(&state.newsroom, list).await
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    state.newsroom.spawn_load_all();

    // Return refreshing state immediately, with the old content cleared
    let button = RefreshButtonTemplate { refreshing: true }.render()?;
    let indicators = IndicatorsTemplate {
        loading: true,
        failed: false,
        oob: true,
    }
    .render()?;
    let cleared = r#"<main id="news-container" hx-swap-oob="innerHTML"></main>"#;

    Ok(Html(format!("{}{}{}", button, indicators, cleared)))
}

pub async fn refresh_status(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let indicators = indicators(&state.newsroom, true).await;
    let refreshing = indicators.loading;
    let body = RefreshButtonTemplate { refreshing }.render()? + &indicators.render()?;

    if refreshing {
        Ok(Html(body).into_response())
    } else {
        Ok(([("HX-Trigger", "articles-updated")], Html(body)).into_response())
    }
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
