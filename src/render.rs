//! Pure projection of the article collection into display content.

use askama::Template;
use chrono::{DateTime, Utc};

use crate::article::Article;
use crate::filter::Filter;

pub struct ArticleCard {
    pub source: String,
    pub source_name: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub thumbnail: String,
    pub date: String,
}

/// The content region: one card per article in the working set, or a
/// placeholder when the working set is empty.
#[derive(Template)]
#[template(path = "articles.html")]
pub struct ArticleList {
    pub cards: Vec<ArticleCard>,
}

/// Articles selected by `filter`, in their existing order.
pub fn working_set<'a>(articles: &'a [Article], filter: &Filter) -> Vec<&'a Article> {
    articles.iter().filter(|a| filter.matches(a)).collect()
}

pub fn render(articles: &[Article], filter: &Filter, now: DateTime<Utc>) -> ArticleList {
    let cards = working_set(articles, filter)
        .into_iter()
        .map(|article| ArticleCard {
            source: article.source.clone(),
            source_name: article.source_name.clone(),
            title: article.title.clone(),
            link: article.link.clone(),
            description: article.description.clone(),
            thumbnail: article.thumbnail.clone(),
            date: format_relative(article.published(), now),
        })
        .collect();

    ArticleList { cards }
}

/// Human-relative age of `published` as seen from `now`.
pub fn format_relative(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(date) = published else {
        return "Date unknown".to_string();
    };

    let elapsed = if now >= date { now - date } else { date - now };
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{} hour{} ago", hours, if hours > 1 { "s" } else { "" })
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{} days ago", days)
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}
