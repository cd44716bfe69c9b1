use std::fmt;

use crate::article::Article;

pub const ALL: &str = "all";

/// The currently selected source filter. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Source(String),
}

impl Filter {
    /// `"all"` (or nothing) selects every source, anything else names one.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL {
            Filter::All
        } else {
            Filter::Source(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Filter::All => ALL,
            Filter::Source(id) => id.as_str(),
        }
    }

    pub fn matches(&self, article: &Article) -> bool {
        match self {
            Filter::All => true,
            Filter::Source(id) => article.source == *id,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
