//! Config schema types (agents, bindings, messages, per-provider policy).

use std::collections::HashMap;

use {
    serde::{Deserialize, Serialize},
    switchboard_common::types::{Peer, PeerKind},
};

/// Agent identity (name, emoji, theme).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentIdentity {
    pub name: Option<String>,
    pub emoji: Option<String>,
    /// Freeform theme/persona text; not interpreted by the core.
    pub theme: Option<String>,
}

/// A logical bot persona with its own session namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    /// Marks the fallback agent used when no binding matches.
    #[serde(default, rename = "default")]
    pub is_default: bool,
    #[serde(default)]
    pub identity: Option<AgentIdentity>,
}

/// Static agent definitions. Immutable at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    pub list: Vec<AgentConfig>,
}

/// Match rule side of a [`Binding`]. All present fields must match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingMatch {
    pub provider: String,
    #[serde(default)]
    pub peer: Option<PeerMatch>,
    #[serde(default)]
    pub team_id: Option<String>,
}

/// Peer selector inside a binding match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerMatch {
    pub kind: PeerKind,
    pub id: String,
}

impl PeerMatch {
    #[must_use]
    pub fn matches(&self, peer: &Peer) -> bool {
        self.kind == peer.kind && self.id == peer.id
    }
}

/// Maps an incoming message's provider/peer/team to an agent.
/// Evaluated first-match; absence of any match falls back to the default agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binding {
    pub agent_id: String,
    #[serde(rename = "match")]
    pub rule: BindingMatch,
}

/// DM access policy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DmPolicy {
    /// Anyone can DM the bot.
    Open,
    /// Only peers on the allow list.
    Allowlist,
    /// Unknown peers get a pairing code and must pair out of band.
    #[default]
    Pairing,
}

/// DM gating for one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DmConfig {
    pub enabled: bool,
    pub policy: DmPolicy,
    /// Allowed peer ids. `*` wildcards are permitted.
    pub allow_from: Vec<String>,
}

impl Default for DmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            policy: DmPolicy::default(),
            allow_from: Vec::new(),
        }
    }
}

/// Per-channel override. A channel without an entry (or with `allow = false`)
/// is silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub allow: bool,
    pub require_mention: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            allow: false,
            require_mention: true,
        }
    }
}

/// Where replies attach relative to the incoming message.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReplyToMode {
    /// Replies stay unthreaded unless the incoming message was in a thread.
    #[default]
    Off,
    /// Always thread the reply under the incoming message.
    All,
    /// Replies to non-threaded messages stay at the conversation root.
    First,
}

/// Destination policy for one provider (Slack, Telegram, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub dm: DmConfig,
    pub channels: HashMap<String, ChannelConfig>,
    pub reply_to_mode: ReplyToMode,
}

/// When to apply the ack reaction to an incoming message.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AckReactionScope {
    /// Only mention-gated group/channel messages.
    #[default]
    GroupMentions,
    /// Every message that reaches the reply engine.
    All,
    /// Never react.
    Off,
}

/// Group-chat activation settings shared across providers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupChatConfig {
    /// Regex patterns that count as a mention even without platform mention
    /// syntax.
    pub mention_patterns: Vec<String>,
}

/// Message branding/ack overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Explicit prefix for relayed/out-of-band messages. Overrides the
    /// identity-derived prefix.
    pub message_prefix: Option<String>,
    /// Explicit prefix for engine replies. Never derived from agent identity.
    pub response_prefix: Option<String>,
    /// Explicit ack reaction emoji. Overrides the identity emoji.
    pub ack_reaction: Option<String>,
    pub ack_reaction_scope: AckReactionScope,
    pub group_chat: GroupChatConfig,
}

/// Root configuration snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchboardConfig {
    pub agents: AgentsConfig,
    pub bindings: Vec<Binding>,
    pub messages: MessagesConfig,
    pub slack: ProviderConfig,
    pub telegram: ProviderConfig,
    pub discord: ProviderConfig,
    pub whatsapp: ProviderConfig,
    pub signal: ProviderConfig,
    pub imessage: ProviderConfig,
    pub msteams: ProviderConfig,
}

impl SwitchboardConfig {
    /// Look up the destination policy for a provider by channel name.
    #[must_use]
    pub fn provider(&self, channel: &str) -> Option<&ProviderConfig> {
        match channel {
            "slack" => Some(&self.slack),
            "telegram" => Some(&self.telegram),
            "discord" => Some(&self.discord),
            "whatsapp" => Some(&self.whatsapp),
            "signal" => Some(&self.signal),
            "imessage" => Some(&self.imessage),
            "msteams" => Some(&self.msteams),
            _ => None,
        }
    }

    #[must_use]
    pub fn agent(&self, agent_id: &str) -> Option<&AgentConfig> {
        self.agents.list.iter().find(|a| a.id == agent_id)
    }

    /// Id of the fallback agent: the one marked `default`, else the first
    /// defined agent, else `main`.
    #[must_use]
    pub fn default_agent_id(&self) -> &str {
        self.agents
            .list
            .iter()
            .find(|a| a.is_default)
            .or_else(|| self.agents.list.first())
            .map_or("main", |a| a.id.as_str())
    }
}
