//! Access-control and mention gating policy.
//!
//! Shared by every provider pipeline so DM policy, channel allow flags, and
//! mention rules behave identically across platforms.

use {
    switchboard_config::{ChannelConfig, DmConfig, DmPolicy, ProviderConfig},
    tracing::warn,
};

/// Leading character that marks a control command ("/pair", "/elevated off").
pub const COMMAND_PREFIX: char = '/';

/// Outcome of evaluating the access gate for a DM peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Message may reach the reply engine.
    Allow,
    /// Unknown peer under pairing policy: issue a pairing code, do not
    /// invoke the engine.
    Pair,
    /// Drop silently.
    Deny,
}

/// Check a peer id against an allow list.
///
/// Entries match case-insensitively and may contain glob-style `*`
/// wildcards. An empty list matches nothing; open access is a policy
/// decision, not an empty list.
#[must_use]
pub fn is_listed(peer_id: &str, allowlist: &[String]) -> bool {
    let peer_lower = peer_id.to_lowercase();
    allowlist.iter().any(|pattern| {
        let pat = pattern.to_lowercase();
        if pat.contains('*') {
            glob_match(&pat, &peer_lower)
        } else {
            pat == peer_lower
        }
    })
}

/// Simple glob matching supporting `*` as a wildcard for any sequence of chars.
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == text;
    }

    let mut pos = 0;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        match text[pos..].find(part) {
            Some(idx) => {
                // First segment must match at start
                if i == 0 && idx != 0 {
                    return false;
                }
                pos += idx + part.len();
            },
            None => return false,
        }
    }
    // Last segment must match at end (unless pattern ends with *)
    if !parts.last().unwrap_or(&"").is_empty() {
        pos == text.len()
    } else {
        true
    }
}

/// Evaluate the DM gate for a sender. `store_allow` carries peers approved
/// through completed pairing, read from the external pairing store.
#[must_use]
pub fn evaluate_dm_gate(dm: &DmConfig, store_allow: &[String], sender_id: &str) -> GateDecision {
    if !dm.enabled {
        return GateDecision::Deny;
    }
    match dm.policy {
        DmPolicy::Open => GateDecision::Allow,
        DmPolicy::Allowlist => {
            if is_listed(sender_id, &dm.allow_from) || is_listed(sender_id, store_allow) {
                GateDecision::Allow
            } else {
                GateDecision::Deny
            }
        },
        DmPolicy::Pairing => {
            if is_listed(sender_id, &dm.allow_from) || is_listed(sender_id, store_allow) {
                GateDecision::Allow
            } else {
                GateDecision::Pair
            }
        },
    }
}

/// Channel/group gate: a channel must carry an explicit `allow` flag before
/// any further gating runs. Returns the channel override when allowed.
#[must_use]
pub fn evaluate_channel_gate<'a>(
    provider: &'a ProviderConfig,
    channel_id: &str,
) -> Option<&'a ChannelConfig> {
    provider
        .channels
        .get(channel_id)
        .filter(|channel| channel.allow)
}

/// True when the text matches any configured mention pattern. Invalid
/// patterns are skipped with a warning rather than failing the message.
#[must_use]
pub fn matches_mention_patterns(text: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| match regex::Regex::new(pattern) {
        Ok(re) => re.is_match(text),
        Err(e) => {
            warn!(pattern, error = %e, "ignoring invalid mention pattern");
            false
        },
    })
}

/// Control commands always satisfy the mention requirement.
#[must_use]
pub fn is_control_command(text: &str) -> bool {
    text.trim_start().starts_with(COMMAND_PREFIX)
}
