//! Pure session-key derivation. No I/O.

use std::fmt;

use serde::{Deserialize, Serialize};

const THREAD_SEGMENT: &str = ":thread:";

/// Conversation scope below the agent namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionScope {
    /// Direct messages share the agent's main session.
    Main,
    /// A provider channel, e.g. `slack:channel:C1`.
    Channel { provider: String, channel_id: String },
}

impl SessionScope {
    #[must_use]
    pub fn channel(provider: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self::Channel {
            provider: provider.into(),
            channel_id: channel_id.into(),
        }
    }
}

impl fmt::Display for SessionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => f.write_str("main"),
            Self::Channel {
                provider,
                channel_id,
            } => write!(f, "{provider}:channel:{channel_id}"),
        }
    }
}

/// Hierarchical conversation identifier: `agent:<agentId>:<scope>[:thread:<id>]`.
///
/// Stripping the `:thread:<id>` suffix from a thread key always yields the
/// root key for the same agent and scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Root key for an agent and scope.
    #[must_use]
    pub fn root(agent_id: &str, scope: &SessionScope) -> Self {
        Self(format!("agent:{agent_id}:{scope}"))
    }

    /// Child key scoped to a platform thread.
    #[must_use]
    pub fn thread(&self, thread_id: &str) -> Self {
        Self(format!("{}{THREAD_SEGMENT}{thread_id}", self.0))
    }

    /// Parent key of a thread key; `None` for root keys.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0
            .rfind(THREAD_SEGMENT)
            .map(|idx| Self(self.0[..idx].to_string()))
    }

    #[must_use]
    pub fn is_thread(&self) -> bool {
        self.0.contains(THREAD_SEGMENT)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SessionKey> for String {
    fn from(key: SessionKey) -> Self {
        key.0
    }
}

/// Whether an incoming message is a reply inside a thread.
///
/// True when the thread id differs from the message's own id. Some platforms
/// mark a reply to the thread root with parent authorship metadata while
/// keeping the two ids equal; that counts as a thread reply too.
#[must_use]
pub fn is_thread_reply(
    message_id: &str,
    thread_id: Option<&str>,
    parent_user_id: Option<&str>,
) -> bool {
    match thread_id {
        Some(tid) if tid != message_id => true,
        Some(_) => parent_user_id.is_some(),
        None => false,
    }
}
