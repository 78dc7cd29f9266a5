//! Reddit Atom feed adapter.
//!
//! Pulls the subreddit's `.rss` endpoint and extracts id, author, title,
//! body HTML and link per entry. Extraction is deliberately minimal: it
//! handles the markup Reddit actually emits, not arbitrary Atom.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::FeedError;
use crate::feed::{FeedSource, Item};

const FEED_USER_AGENT: &str = "WatchExchangeTelegramBot/0.1 (by u/Vast_Requirement8134)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

static ENTRY_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<link[^>]*href="([^"]*)""#).unwrap());
static ENTRY_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title[^>]*>(.*?)</title>").unwrap());
static ENTRY_AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<author>.*?<name>([^<]*)</name>").unwrap());
static ENTRY_CONTENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<content[^>]*>(.*?)</content>").unwrap());
static POST_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/comments/([a-z0-9]+)/").unwrap());
static USER_HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"u/([A-Za-z0-9_-]+)").unwrap());

/// Feed adapter for Reddit's per-subreddit Atom endpoint.
pub struct RedditFeed {
    client: reqwest::Client,
}

impl RedditFeed {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for RedditFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSource for RedditFeed {
    async fn fetch(&self, url: &str) -> Result<Vec<Item>, FeedError> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, FEED_USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| FeedError::Unreachable {
                reason: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| FeedError::Unreachable {
            reason: e.to_string(),
        })?;
        debug!(status = %status, bytes = body.len(), "fetched feed");

        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        let items = parse_feed(&body);
        if items.is_empty() {
            warn!("feed body contained no entries");
        }
        Ok(items)
    }
}

/// Split the document into `<entry>` blocks and extract each one.
fn parse_feed(xml: &str) -> Vec<Item> {
    let mut items = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find("<entry") {
        let after = &rest[start..];
        let Some(end) = after.find("</entry>") else {
            break;
        };
        items.push(parse_entry(&after[..end]));
        rest = &after[end + "</entry>".len()..];
    }
    items
}

fn parse_entry(entry: &str) -> Item {
    let link = first_capture(&ENTRY_LINK_RE, entry)
        .unwrap_or_default()
        .trim()
        .to_string();
    let title = unescape_entities(first_capture(&ENTRY_TITLE_RE, entry).unwrap_or_default().trim());
    let author = normalize_author(first_capture(&ENTRY_AUTHOR_RE, entry).unwrap_or_default());
    let summary_html = unescape_entities(first_capture(&ENTRY_CONTENT_RE, entry).unwrap_or_default());

    Item {
        id: extract_post_id(&link),
        author,
        title,
        summary_html,
        link,
    }
}

fn first_capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Stable item id: the post's path segment, falling back to the raw link.
pub fn extract_post_id(link: &str) -> String {
    if let Some(caps) = POST_ID_RE.captures(link) {
        return caps[1].to_string();
    }
    link.trim().to_string()
}

/// Reduce an author string to its bare lowercase handle.
///
/// Accepts `/u/Name`, `u/Name` or a plain name, in any casing.
pub fn normalize_author(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Some(caps) = USER_HANDLE_RE.captures(raw) {
        return caps[1].to_lowercase();
    }
    raw.to_lowercase()
        .replace("/u/", "")
        .replace("u/", "")
        .trim()
        .to_string()
}

/// Decode the entity set Reddit's Atom output emits.
///
/// `&amp;` goes last so double-escaped sequences decode exactly once.
pub fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&#32;", " ")
        .replace("&amp;", "&")
}
