//! Filter matcher — pure decision logic for one item against one config.

use crate::feed::Item;
use crate::relay::registry::SubscriberConfig;

/// Why (and whether) an item is delivered to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub author_match: bool,
    /// Matched keywords in the config's own order.
    pub keyword_matches: Vec<String>,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        self.author_match || !self.keyword_matches.is_empty()
    }

    /// Annotation for the outgoing notification. Meaningful only when
    /// `is_match()` holds.
    pub fn label(&self) -> String {
        if self.author_match && !self.keyword_matches.is_empty() {
            "tracked author + keyword match".to_string()
        } else if self.author_match {
            "tracked author".to_string()
        } else {
            format!("keyword match: {}", self.keyword_matches.join(", "))
        }
    }
}

/// Evaluate one item against one subscriber's filters.
///
/// Author matching is exact on the normalized handle. Keyword matching is
/// substring containment on the lowercased title, so "go" matches "going";
/// that looseness is intended.
pub fn match_item(item: &Item, config: &SubscriberConfig) -> MatchResult {
    let title = item.title.to_lowercase();

    let author_match = config.tracked_users.iter().any(|author| *author == item.author);
    let keyword_matches = config
        .keywords
        .iter()
        .filter(|keyword| title.contains(keyword.as_str()))
        .cloned()
        .collect();

    MatchResult {
        author_match,
        keyword_matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(author: &str, title: &str) -> Item {
        Item {
            id: "1abc23".to_string(),
            author: author.to_string(),
            title: title.to_string(),
            summary_html: String::new(),
            link: "https://example.test".to_string(),
        }
    }

    fn config(keywords: &[&str], tracked: &[&str]) -> SubscriberConfig {
        SubscriberConfig {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            tracked_users: tracked.iter().map(|s| s.to_string()).collect(),
            mode: None,
        }
    }

    // ── OR-semantics tests ────────────────────────────────────────────

    #[test]
    fn keyword_hit_alone_matches() {
        let config = config(&["seiko"], &["alice"]);
        let result = match_item(&item("bob", "Selling a Seiko 5"), &config);
        assert!(result.is_match());
        assert!(!result.author_match);
        assert_eq!(result.label(), "keyword match: seiko");
    }

    #[test]
    fn tracked_author_alone_matches() {
        let config = config(&["seiko"], &["alice"]);
        let result = match_item(&item("alice", "unrelated"), &config);
        assert!(result.is_match());
        assert!(result.author_match);
        assert_eq!(result.label(), "tracked author");
    }

    #[test]
    fn neither_filter_matches() {
        let config = config(&["seiko"], &["alice"]);
        let result = match_item(&item("bob", "unrelated"), &config);
        assert!(!result.is_match());
    }

    #[test]
    fn both_filters_produce_combined_label() {
        let config = config(&["seiko"], &["alice"]);
        let result = match_item(&item("alice", "[WTS] Seiko SKX007"), &config);
        assert!(result.author_match);
        assert_eq!(result.keyword_matches, vec!["seiko"]);
        assert_eq!(result.label(), "tracked author + keyword match");
    }

    // ── Keyword semantics tests ───────────────────────────────────────

    #[test]
    fn keywords_match_as_substrings() {
        let config = config(&["go"], &[]);
        assert!(match_item(&item("bob", "It keeps going"), &config).is_match());
    }

    #[test]
    fn keyword_label_preserves_config_order() {
        let config = config(&["omega", "seiko"], &[]);
        let result = match_item(&item("bob", "Seiko and Omega bundle"), &config);
        assert_eq!(result.label(), "keyword match: omega, seiko");
    }

    #[test]
    fn title_matching_is_case_insensitive() {
        let config = config(&["seiko"], &[]);
        assert!(match_item(&item("bob", "SEIKO SKX007"), &config).is_match());
    }

    // ── Author semantics tests ────────────────────────────────────────

    #[test]
    fn author_match_is_exact_not_substring() {
        let config = config(&[], &["alice"]);
        assert!(!match_item(&item("alice2", "unrelated"), &config).is_match());
        assert!(match_item(&item("alice", "unrelated"), &config).is_match());
    }

    #[test]
    fn unknown_author_never_matches() {
        // Normalization drops empty entries, so an item with no author
        // cannot match an authors filter.
        let config = config(&[], &["alice"]);
        assert!(!match_item(&item("", "unrelated"), &config).is_match());
    }

    #[test]
    fn empty_filters_match_nothing() {
        let config = config(&[], &[]);
        assert!(!match_item(&item("alice", "[WTS] Seiko SKX007"), &config).is_match());
    }
}
