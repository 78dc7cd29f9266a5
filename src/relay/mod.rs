//! Dispatch core — ledger, registry, matcher, command interpreter, loop.

pub mod commands;
pub mod engine;
pub mod ledger;
pub mod matcher;
pub mod notify;
pub mod registry;

pub use engine::{Relay, RelayDeps};
pub use ledger::SeenLedger;
pub use matcher::{MatchResult, match_item};
pub use registry::{AwaitMode, SubscriberConfig, SubscriberRegistry};
