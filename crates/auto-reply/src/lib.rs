//! Reply plumbing between the inbound pipelines and the platform adapters.
//!
//! Flow: pipeline invokes the reply engine with a session-keyed context →
//! the engine streams intermediate events (reply start, tool results) →
//! each event and the terminal payload go through [`route_reply`] to the
//! adapter registered for the destination channel.

pub mod engine;
pub mod error;
pub mod route_reply;
pub mod tokens;

pub use {
    engine::{
        ReplyContext, ReplyEngine, ReplyEvent, ReplyEventReceiver, ReplyEventSender,
        reply_event_channel,
    },
    error::{Error, Result},
    route_reply::{ReplyRouter, RouteRequest},
    tokens::SILENT_REPLY_TOKEN,
};
