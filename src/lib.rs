//! Watch Relay — feed-to-messenger notification relay.

pub mod config;
pub mod error;
pub mod feed;
pub mod relay;
pub mod store;
pub mod transport;

pub use error::{Error, Result};
