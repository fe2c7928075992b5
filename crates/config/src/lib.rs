//! Configuration snapshot for the gateway core.
//!
//! The core never reads ambient/global config: a [`SwitchboardConfig`] is
//! loaded once, wrapped in an `Arc`, and passed explicitly through every
//! resolver and pipeline call. It is read-only after load.

pub mod load;
pub mod schema;

pub use {
    load::{Error as LoadError, from_path, from_toml_str},
    schema::{
        AckReactionScope, AgentConfig, AgentIdentity, AgentsConfig, Binding, BindingMatch,
        ChannelConfig, DmConfig, DmPolicy, GroupChatConfig, MessagesConfig, PeerMatch,
        ProviderConfig, ReplyToMode, SwitchboardConfig,
    },
};
