//! Message-level types shared between the inbound pipelines and the
//! outbound reply router.

use serde::{Deserialize, Serialize};

/// A reply produced by the reply engine, ready for outbound routing.
///
/// An empty payload (no text, no media) means "nothing to send" and routes
/// as a no-op.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyPayload {
    pub text: Option<String>,
    /// Media attachment URLs, sent in order. Only the first send carries
    /// the text as caption.
    pub media_urls: Vec<String>,
    /// Explicit reply target returned by the engine. Overrides the
    /// pipeline's reply-to mode when present.
    pub reply_to_id: Option<String>,
}

impl ReplyPayload {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// True when there is neither text nor media to deliver.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().is_none_or(|t| t.trim().is_empty()) && self.media_urls.is_empty()
    }
}

/// Kind of conversation partner on the remote platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerKind {
    Dm,
    Channel,
    Group,
}

/// Logical conversation partner: a DM user, a channel, or a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub kind: PeerKind,
    pub id: String,
}

impl Peer {
    #[must_use]
    pub fn dm(id: impl Into<String>) -> Self {
        Self {
            kind: PeerKind::Dm,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn channel(id: impl Into<String>) -> Self {
        Self {
            kind: PeerKind::Channel,
            id: id.into(),
        }
    }
}

/// A platform event normalized by a provider pipeline.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub sender_id: String,
    pub text: String,
    /// Platform message id (Slack: the message `ts`).
    pub message_id: String,
    pub channel_id: String,
    /// Thread root id, when the platform reports one.
    pub thread_id: Option<String>,
    /// Author of the thread root. Some platforms mark a reply to the thread
    /// root with this even when `thread_id == message_id`.
    pub parent_user_id: Option<String>,
    pub is_direct_message: bool,
}

impl InboundEvent {
    /// The peer this event belongs to for binding/gating purposes.
    #[must_use]
    pub fn peer(&self) -> Peer {
        if self.is_direct_message {
            Peer::dm(self.sender_id.clone())
        } else {
            Peer::channel(self.channel_id.clone())
        }
    }
}

/// Identifiers returned by a provider adapter after a successful send.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SentMessage {
    pub message_id: String,
    /// Platform-specific secondary id (Slack/Discord channel, Telegram chat,
    /// WhatsApp JID), when the platform reports one.
    pub channel_id: Option<String>,
}
