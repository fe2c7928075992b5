//! Route inbound messages to agents and resolve identity branding.
//!
//! Binding evaluation is first-match over the configured list; a binding
//! matches when its provider, peer (if present), and team id (if present)
//! all match the incoming message. No match falls back to the default agent.

pub mod identity;
pub mod resolve;

pub use {
    identity::{
        DEFAULT_ACK_REACTION, MessagePrefixOpts, resolve_ack_reaction, resolve_agent_identity,
        resolve_identity_name_prefix, resolve_message_prefix, resolve_response_prefix,
    },
    resolve::resolve_agent_id,
};
