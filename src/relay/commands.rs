//! Command interpreter — turns inbound subscriber text into registry
//! mutations and a reply.
//!
//! Commands are matched on their case-sensitive leading token and always
//! win over a pending awaiting mode. Every inbound message, recognized or
//! not, registers the subscriber on first contact.

use crate::relay::registry::{AwaitMode, SubscriberConfig, SubscriberRegistry};

const HELP_TEXT: &str = "Commands:\n\
/start - register or show welcome\n\
/keywords seiko, omega - set keywords (or /keywords clear)\n\
/authors ParentalAdvice, AudaciousCo - set tracked authors (or /authors clear)\n\
/settings - show current settings";

const UNRECOGNIZED_TEXT: &str = "Unknown command. Use /help to see available commands.";

const KEYWORDS_USAGE: &str =
    "Usage: /keywords seiko, omega, tudor\nOr just send me the list now.";
const AUTHORS_USAGE: &str =
    "Usage: /authors ParentalAdvice, AudaciousCo\nOr just send me the list now.";

/// Which filter set a command or awaiting mode targets.
#[derive(Debug, Clone, Copy)]
enum FilterKind {
    Keywords,
    Authors,
}

impl FilterKind {
    fn await_mode(self) -> AwaitMode {
        match self {
            FilterKind::Keywords => AwaitMode::AwaitingKeywords,
            FilterKind::Authors => AwaitMode::AwaitingAuthors,
        }
    }

    fn usage(self) -> &'static str {
        match self {
            FilterKind::Keywords => KEYWORDS_USAGE,
            FilterKind::Authors => AUTHORS_USAGE,
        }
    }

    fn confirmation(self, values: &[String]) -> String {
        let rendered = render_values(values);
        match self {
            FilterKind::Keywords => format!("✅ Keywords updated: {rendered}"),
            FilterKind::Authors => format!("✅ Tracked authors updated: {rendered}"),
        }
    }

    fn assign(self, config: &mut SubscriberConfig, values: Vec<String>) {
        match self {
            FilterKind::Keywords => config.keywords = values,
            FilterKind::Authors => config.tracked_users = values,
        }
    }
}

/// Interpret one inbound message and produce the reply text.
///
/// Registers the subscriber on first contact before anything else, so even
/// an unrecognized first message creates an empty config.
pub async fn handle_inbound(
    registry: &mut SubscriberRegistry,
    subscriber_id: i64,
    text: &str,
) -> String {
    let text = text.trim();

    if registry.get(subscriber_id).is_none() {
        registry.upsert(subscriber_id, |_| {}).await;
    }

    let (command, rest) = match text.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (text, ""),
    };

    match command {
        "/start" => {
            registry.upsert(subscriber_id, |config| config.mode = None).await;
            onboarding_text(registry.get(subscriber_id).cloned().unwrap_or_default())
        }
        "/help" => {
            registry.upsert(subscriber_id, |config| config.mode = None).await;
            HELP_TEXT.to_string()
        }
        "/settings" => {
            registry.upsert(subscriber_id, |config| config.mode = None).await;
            settings_text(registry.get(subscriber_id).cloned().unwrap_or_default())
        }
        "/keywords" => set_filters(registry, subscriber_id, FilterKind::Keywords, rest).await,
        "/authors" => set_filters(registry, subscriber_id, FilterKind::Authors, rest).await,
        _ => {
            let mode = registry.get(subscriber_id).and_then(|config| config.mode);
            match mode {
                Some(AwaitMode::AwaitingKeywords) => {
                    apply_awaited(registry, subscriber_id, FilterKind::Keywords, text).await
                }
                Some(AwaitMode::AwaitingAuthors) => {
                    apply_awaited(registry, subscriber_id, FilterKind::Authors, text).await
                }
                None => UNRECOGNIZED_TEXT.to_string(),
            }
        }
    }
}

/// `/keywords <rest>` and `/authors <rest>`.
async fn set_filters(
    registry: &mut SubscriberRegistry,
    subscriber_id: i64,
    kind: FilterKind,
    rest: &str,
) -> String {
    if rest.is_empty() {
        registry
            .upsert(subscriber_id, |config| config.mode = Some(kind.await_mode()))
            .await;
        return kind.usage().to_string();
    }

    if rest.to_lowercase() == "clear" {
        registry
            .upsert(subscriber_id, |config| {
                kind.assign(config, Vec::new());
                config.mode = None;
            })
            .await;
        return kind.confirmation(&[]);
    }

    let values = parse_list(rest);
    if values.is_empty() {
        registry.upsert(subscriber_id, |config| config.mode = None).await;
        return kind.usage().to_string();
    }
    replace_filters(registry, subscriber_id, kind, values).await
}

/// Plain text received while the subscriber is in an awaiting mode.
async fn apply_awaited(
    registry: &mut SubscriberRegistry,
    subscriber_id: i64,
    kind: FilterKind,
    text: &str,
) -> String {
    let values = parse_list(text);
    if values.is_empty() {
        registry.upsert(subscriber_id, |config| config.mode = None).await;
        return kind.usage().to_string();
    }
    replace_filters(registry, subscriber_id, kind, values).await
}

async fn replace_filters(
    registry: &mut SubscriberRegistry,
    subscriber_id: i64,
    kind: FilterKind,
    values: Vec<String>,
) -> String {
    let confirmation = kind.confirmation(&values);
    registry
        .upsert(subscriber_id, |config| {
            kind.assign(config, values);
            config.mode = None;
        })
        .await;
    confirmation
}

/// Split a raw argument string into normalized tokens: comma or semicolon
/// separated, trimmed, surrounding quotes stripped, empties dropped,
/// lowercased. Order preserved, duplicates kept.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(|token| {
            token
                .trim()
                .trim_matches(|c| c == '\'' || c == '"' || c == ' ')
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

fn render_values(values: &[String]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values.join(", ")
    }
}

fn onboarding_text(config: SubscriberConfig) -> String {
    format!(
        "👋 Hi! I've registered you.\n\n\
         I'll notify you about every new post that matches any of your keywords or comes from a tracked author (either one is enough).\n\n\
         Keywords: {}\n\
         Tracked authors: {}\n\n\
         You can change them with:\n\
         /keywords seiko, omega, tudor\n\
         /authors ParentalAdvice, AudaciousCo\n\
         /settings to see current config.",
        render_values(&config.keywords),
        render_values(&config.tracked_users),
    )
}

fn settings_text(config: SubscriberConfig) -> String {
    format!(
        "📋 Your current settings:\n\n\
         Keywords: {}\n\
         Tracked authors: {}\n\n\
         Use /keywords and /authors to change them.",
        render_values(&config.keywords),
        render_values(&config.tracked_users),
    )
}
