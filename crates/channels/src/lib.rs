//! Provider adapter contract and access-control policy.
//!
//! Each platform (Slack, Telegram, Discord, WhatsApp, Signal, iMessage,
//! MS Teams) implements [`ChannelOutbound`] behind its own transport; the
//! core only sees the uniform send contract. Gating and pairing policy live
//! here so every inbound pipeline evaluates them the same way.

pub mod error;
pub mod gating;
pub mod pairing;
pub mod plugin;
pub mod registry;

pub use {
    error::{Error, Result},
    gating::{GateDecision, evaluate_channel_gate, evaluate_dm_gate, is_listed},
    pairing::{MemoryPairingStore, PairingRequest, PairingStore},
    plugin::{ChannelOutbound, SendOptions},
    registry::ChannelRegistry,
};
