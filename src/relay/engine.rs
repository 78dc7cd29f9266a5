//! Dispatch loop — one scheduler tick drives command polling every
//! iteration and feed polling on its own elapsed-time gate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::feed::{FeedSource, Item};
use crate::relay::commands;
use crate::relay::ledger::SeenLedger;
use crate::relay::matcher;
use crate::relay::notify;
use crate::relay::registry::SubscriberRegistry;
use crate::transport::{SendOptions, Transport};

/// Everything the relay needs injected: the two adapters and the two
/// loaded state objects.
pub struct RelayDeps {
    pub feed: Arc<dyn FeedSource>,
    pub transport: Arc<dyn Transport>,
    pub ledger: SeenLedger,
    pub registry: SubscriberRegistry,
}

/// The dispatch engine. Owns all mutable relay state for the process
/// lifetime; `run` is the only long-lived entry point.
pub struct Relay {
    config: Config,
    feed: Arc<dyn FeedSource>,
    transport: Arc<dyn Transport>,
    ledger: SeenLedger,
    registry: SubscriberRegistry,
    cursor: Option<i64>,
    last_feed_poll: Option<Instant>,
    shutdown: Arc<AtomicBool>,
}

impl Relay {
    pub fn new(config: Config, deps: RelayDeps) -> Self {
        Self {
            config,
            feed: deps.feed,
            transport: deps.transport,
            ledger: deps.ledger,
            registry: deps.registry,
            cursor: None,
            last_feed_poll: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked at the top of every tick; set it to stop the loop.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn ledger(&self) -> &SeenLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    /// Run until the shutdown flag is set, then persist both documents.
    pub async fn run(mut self) {
        info!(
            feed_url = %self.config.feed_url,
            command_poll_secs = self.config.command_poll_interval.as_secs(),
            feed_poll_secs = self.config.feed_poll_interval.as_secs(),
            "relay started"
        );

        let mut tick = tokio::time::interval(self.config.command_poll_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tick.tick().await;
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }

            self.command_tick().await;

            if self.feed_due() {
                self.last_feed_poll = Some(Instant::now());
                self.feed_tick().await;
            }
        }

        // Best-effort final persist.
        self.ledger.persist().await;
        self.registry.persist_all().await;
        info!("relay stopped");
    }

    fn feed_due(&self) -> bool {
        self.last_feed_poll
            .is_none_or(|last| last.elapsed() >= self.config.feed_poll_interval)
    }

    /// Drain inbound messages, route each through the command interpreter,
    /// reply in plain text. The cursor advances past every update, text or
    /// not, so nothing is re-fetched.
    pub async fn command_tick(&mut self) {
        let batch = match self.transport.poll_inbound(self.cursor).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "inbound poll failed");
                return;
            }
        };

        for message in batch {
            self.cursor = Some(match self.cursor {
                Some(cursor) => cursor.max(message.cursor),
                None => message.cursor,
            });

            let text = message.text.trim();
            if text.is_empty() || message.subscriber_id == 0 {
                debug!(cursor = message.cursor, "skipping non-text update");
                continue;
            }

            info!(subscriber = message.subscriber_id, text, "inbound message");
            let reply = commands::handle_inbound(&mut self.registry, message.subscriber_id, text).await;
            if let Err(e) = self
                .transport
                .send_text(message.subscriber_id, &reply, SendOptions::plain())
                .await
            {
                warn!(subscriber = message.subscriber_id, error = %e, "failed to send reply");
            }
        }
    }

    /// Fetch the feed and dispatch every unseen item, persisting the
    /// ledger after each one.
    pub async fn feed_tick(&mut self) {
        let items = match self.feed.fetch(&self.config.feed_url).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "feed fetch failed");
                return;
            }
        };

        debug!(entries = items.len(), "evaluating feed snapshot");

        for item in items {
            if self.ledger.has(&item.id) {
                continue;
            }

            self.dispatch_item(&item).await;

            // Mark seen whether or not anyone matched; an item is
            // evaluated exactly once, against the registry as of now.
            self.ledger.add(item.id);
            self.ledger.persist().await;
        }
    }

    /// Fan one item out to every matching subscriber. Per-subscriber send
    /// failures are logged and do not stop the fan-out.
    async fn dispatch_item(&self, item: &Item) {
        let image_url = notify::extract_first_image(&item.summary_html);

        for (subscriber_id, config) in self.registry.iter() {
            let result = matcher::match_item(item, config);
            if !result.is_match() {
                continue;
            }

            let text = notify::render_notification(item, &result.label());
            let sent = match image_url.as_deref() {
                Some(url) => {
                    self.transport
                        .send_photo(subscriber_id, url, &text, SendOptions::rich())
                        .await
                }
                None => {
                    self.transport
                        .send_text(subscriber_id, &text, SendOptions::rich())
                        .await
                }
            };

            match sent {
                Ok(()) => info!(
                    item = %item.id,
                    subscriber = subscriber_id,
                    author_match = result.author_match,
                    keywords = result.keyword_matches.len(),
                    "dispatched item"
                ),
                Err(e) => warn!(
                    item = %item.id,
                    subscriber = subscriber_id,
                    error = %e,
                    "failed to deliver item"
                ),
            }
        }
    }
}
