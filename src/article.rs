use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Maximum length of a description excerpt, in characters.
pub const EXCERPT_LEN: usize = 200;

const ELLIPSIS: &str = "...";

/// A feed item normalized into the shape shared by every source.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// Id of the originating source
    pub source: String,
    pub source_name: String,
    pub title: String,
    pub link: String,
    /// Publication date exactly as the upstream service reported it
    pub pub_date: String,
    /// Plain-text excerpt, see [`excerpt`]
    pub description: String,
    /// Image URL, empty when the item has none
    pub thumbnail: String,
}

impl Article {
    pub fn published(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.pub_date)
    }
}

/// Parse the date formats seen in converted feeds. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // rss2json reports "2024-12-09 12:00:00" in UTC
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Strip markup from `html` and cut the result down to [`EXCERPT_LEN`] characters.
pub fn excerpt(html: &str) -> String {
    truncate(&strip_html(html), EXCERPT_LEN)
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Remove tags, comments and `script`/`style` bodies, then decode entities.
///
/// Text content is kept as-is, including surrounding whitespace. A `<` that
/// cannot start a tag (e.g. `a < b`) is kept literally.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let tail = &rest[open + 1..];

        if let Some(comment) = tail.strip_prefix("!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        let starts_tag = tail
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
        if !starts_tag {
            text.push('<');
            rest = tail;
            continue;
        }

        let Some(close) = tag_end(tail) else {
            rest = "";
            break;
        };

        let name = tail[..close]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        rest = &tail[close + 1..];

        if name == "script" || name == "style" {
            rest = skip_raw_text(rest, &name);
        }
    }

    text.push_str(rest);
    html_escape::decode_html_entities(&text).into_owned()
}

/// Skip past the closing tag of a raw-text element.
fn skip_raw_text<'a>(rest: &'a str, name: &str) -> &'a str {
    let marker = format!("</{}", name);
    // ASCII lowercasing keeps byte offsets intact
    match rest.to_ascii_lowercase().find(&marker) {
        Some(pos) => {
            let after = &rest[pos..];
            after.find('>').map_or("", |gt| &after[gt + 1..])
        }
        None => "",
    }
}

/// Byte offset of the `>` closing a tag, ignoring any inside quoted attribute values.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in tag.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            (None, _) => {}
        }
    }
    None
}
