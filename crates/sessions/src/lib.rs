//! Session keys and the session-store contract.
//!
//! Session keys are hierarchical strings consumed by the reply engine's
//! memory: `agent:<agentId>:<scope>[:thread:<threadId>]`. Key derivation is
//! pure; persistence lives behind [`store::SessionStore`].

pub mod key;
pub mod store;

pub use {
    key::{SessionKey, SessionScope, is_thread_reply},
    store::{LastRoute, MemorySessionStore, SessionStore},
};
