//! Read-side Slack collaborator contract.
//!
//! Sends go through the adapter registry; this trait covers the auxiliary
//! capabilities the pipeline needs from the platform: conversation lookups,
//! thread history, reactions, and the assistant status line. The real
//! implementation wraps the Slack Web API; tests implement it directly.

use {async_trait::async_trait, switchboard_common::Result};

/// Bot identity resolved by the transport during its auth handshake.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub user_id: String,
    pub team_id: Option<String>,
}

/// Subset of `conversations.info` the pipeline reads.
#[derive(Debug, Clone, Default)]
pub struct ConversationInfo {
    pub name: Option<String>,
    pub is_im: bool,
}

/// One message from `conversations.replies`.
#[derive(Debug, Clone)]
pub struct ThreadMessage {
    pub user: Option<String>,
    pub text: String,
    pub ts: String,
}

#[async_trait]
pub trait SlackClient: Send + Sync {
    async fn conversation_info(&self, channel_id: &str) -> Result<ConversationInfo>;

    /// Messages of a thread, oldest first. The first entry is the thread's
    /// originating message.
    async fn thread_replies(&self, channel_id: &str, thread_ts: &str)
    -> Result<Vec<ThreadMessage>>;

    async fn add_reaction(&self, channel_id: &str, message_ts: &str, name: &str) -> Result<()>;

    /// Set (or clear, with an empty string) the assistant "working" status
    /// on a conversation thread.
    async fn set_thread_status(&self, channel_id: &str, thread_ts: &str, status: &str)
    -> Result<()>;
}
