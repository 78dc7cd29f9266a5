//! Notification rendering — HTML escaping, preview image, message template.

use std::sync::LazyLock;

use regex::Regex;

use crate::feed::Item;

static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]*src\s*=\s*["']([^"']+)["']"#).unwrap());

/// Escape the characters Telegram's HTML parse mode reserves.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// First `<img src>` of an entry body, fixed up for direct fetching.
pub fn extract_first_image(html: &str) -> Option<String> {
    let caps = IMG_SRC_RE.captures(html)?;
    let mut src = caps[1].replace("&amp;", "&");
    if src.starts_with("//") {
        src = format!("https:{src}");
    }
    Some(src)
}

/// Render the notification sent for one matched item.
///
/// Every interpolated value is escaped except the link, which lands inside
/// a quoted href.
pub fn render_notification(item: &Item, label: &str) -> String {
    let author = if item.author.is_empty() {
        "unknown"
    } else {
        item.author.as_str()
    };
    format!(
        "🕵️ New post ({})\n\n<b>Author:</b> {}\n\n<b>{}</b>\n<a href=\"{}\">Open post</a>",
        escape_html(label),
        escape_html(author),
        escape_html(&item.title),
        item.link,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Escaping tests ────────────────────────────────────────────────

    #[test]
    fn escape_html_covers_reserved_characters() {
        assert_eq!(escape_html("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn escape_html_escapes_ampersand_first() {
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }

    // ── Image extraction tests ────────────────────────────────────────

    #[test]
    fn extract_first_image_finds_src() {
        let html = r#"<table><tr><td><a href="x"><img src="https://b.thumbs.redditmedia.com/a.jpg" alt=""/></a></td></tr></table>"#;
        assert_eq!(
            extract_first_image(html).as_deref(),
            Some("https://b.thumbs.redditmedia.com/a.jpg")
        );
    }

    #[test]
    fn extract_first_image_takes_only_the_first() {
        let html = r#"<img src="https://one.test/a.jpg"/><img src="https://two.test/b.jpg"/>"#;
        assert_eq!(extract_first_image(html).as_deref(), Some("https://one.test/a.jpg"));
    }

    #[test]
    fn extract_first_image_decodes_query_ampersands() {
        let html = r#"<img src="https://preview.redd.it/a.jpg?width=640&amp;auto=webp"/>"#;
        assert_eq!(
            extract_first_image(html).as_deref(),
            Some("https://preview.redd.it/a.jpg?width=640&auto=webp")
        );
    }

    #[test]
    fn extract_first_image_upgrades_scheme_relative_urls() {
        let html = r#"<img src="//b.thumbs.redditmedia.com/a.jpg"/>"#;
        assert_eq!(
            extract_first_image(html).as_deref(),
            Some("https://b.thumbs.redditmedia.com/a.jpg")
        );
    }

    #[test]
    fn extract_first_image_accepts_single_quotes() {
        let html = "<img class='preview' src='https://one.test/a.jpg'/>";
        assert_eq!(extract_first_image(html).as_deref(), Some("https://one.test/a.jpg"));
    }

    #[test]
    fn extract_first_image_none_without_img() {
        assert_eq!(extract_first_image("<p>no pictures</p>"), None);
        assert_eq!(extract_first_image(""), None);
    }

    // ── Template tests ────────────────────────────────────────────────

    #[test]
    fn render_notification_fills_template() {
        let item = Item {
            id: "1abc23".to_string(),
            author: "sellerone".to_string(),
            title: "[WTS] Seiko SKX007 & strap".to_string(),
            summary_html: String::new(),
            link: "https://www.reddit.com/r/Watchexchange/comments/1abc23/".to_string(),
        };
        let text = render_notification(&item, "keyword match: seiko");
        assert_eq!(
            text,
            "🕵️ New post (keyword match: seiko)\n\n\
             <b>Author:</b> sellerone\n\n\
             <b>[WTS] Seiko SKX007 &amp; strap</b>\n\
             <a href=\"https://www.reddit.com/r/Watchexchange/comments/1abc23/\">Open post</a>"
        );
    }

    #[test]
    fn render_notification_defaults_missing_author() {
        let item = Item {
            id: "1abc23".to_string(),
            author: String::new(),
            title: "untitled".to_string(),
            summary_html: String::new(),
            link: "https://example.test".to_string(),
        };
        let text = render_notification(&item, "tracked author");
        assert!(text.contains("<b>Author:</b> unknown"));
    }

    #[test]
    fn render_notification_escapes_title_markup() {
        let item = Item {
            id: "1abc23".to_string(),
            author: "bob".to_string(),
            title: "<script>bad</script>".to_string(),
            summary_html: String::new(),
            link: "https://example.test".to_string(),
        };
        let text = render_notification(&item, "tracked author");
        assert!(text.contains("&lt;script&gt;bad&lt;/script&gt;"));
        assert!(!text.contains("<script>"));
    }
}
