//! Slack inbound pipeline — the reference provider implementation.
//!
//! The wire transport (Socket Mode, webhook server, auth handshake) lives
//! outside the core: something feeds raw [`events::SlackMessageEvent`]s into
//! [`monitor::SlackMonitor`], which gates, session-keys, and relays them to
//! the reply engine, then routes replies back out through the adapter
//! registry.

pub mod client;
pub mod events;
pub mod monitor;

pub use {
    client::{BotIdentity, ConversationInfo, SlackClient, ThreadMessage},
    events::SlackMessageEvent,
    monitor::SlackMonitor,
};

/// Channel name this pipeline serves, as known to bindings, provider
/// config, and the adapter registry.
pub const CHANNEL: &str = "slack";
