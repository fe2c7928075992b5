//! Identity and prefix cascades.
//!
//! Each value is independently overridable by explicit configuration and
//! evaluated top-down; the first matching rule wins. The response prefix is
//! the odd one out: it never derives from agent identity.

use switchboard_config::{AgentIdentity, SwitchboardConfig};

pub const DEFAULT_ACK_REACTION: &str = "👀";

const DEFAULT_MESSAGE_PREFIX: &str = "[switchboard]";

#[must_use]
pub fn resolve_agent_identity<'a>(
    cfg: &'a SwitchboardConfig,
    agent_id: &str,
) -> Option<&'a AgentIdentity> {
    cfg.agent(agent_id)?.identity.as_ref()
}

/// Ack reaction: explicit config → agent identity emoji → default marker.
#[must_use]
pub fn resolve_ack_reaction(cfg: &SwitchboardConfig, agent_id: &str) -> String {
    if let Some(configured) = &cfg.messages.ack_reaction {
        return configured.trim().to_string();
    }
    let emoji = resolve_agent_identity(cfg, agent_id)
        .and_then(|identity| identity.emoji.as_deref())
        .map(str::trim)
        .filter(|e| !e.is_empty());
    emoji.unwrap_or(DEFAULT_ACK_REACTION).to_string()
}

/// Bracketed agent name, or `None` when the agent has no identity name.
#[must_use]
pub fn resolve_identity_name_prefix(cfg: &SwitchboardConfig, agent_id: &str) -> Option<String> {
    let name = resolve_agent_identity(cfg, agent_id)?
        .name
        .as_deref()?
        .trim()
        .to_string();
    if name.is_empty() {
        return None;
    }
    Some(format!("[{name}]"))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePrefixOpts<'a> {
    /// Destination has an explicit allow list; branding is redundant there.
    pub has_allow_from: bool,
    pub fallback: Option<&'a str>,
}

/// Outbound message prefix cascade: explicit config → empty for allow-listed
/// destinations → identity name prefix → caller fallback → built-in default.
#[must_use]
pub fn resolve_message_prefix(
    cfg: &SwitchboardConfig,
    agent_id: &str,
    opts: MessagePrefixOpts<'_>,
) -> String {
    if let Some(configured) = &cfg.messages.message_prefix {
        return configured.clone();
    }
    if opts.has_allow_from {
        return String::new();
    }
    resolve_identity_name_prefix(cfg, agent_id)
        .or_else(|| opts.fallback.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_MESSAGE_PREFIX.to_string())
}

/// Response prefix: explicit config only, never derived from agent identity.
#[must_use]
pub fn resolve_response_prefix(cfg: &SwitchboardConfig) -> Option<&str> {
    cfg.messages.response_prefix.as_deref()
}
