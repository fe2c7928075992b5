use {async_trait::async_trait, serde::Serialize, switchboard_common::types::SentMessage};

use crate::Result;

/// Provider-specific options for one outbound send.
///
/// Field interpretation varies by platform: Slack attaches `thread_id` as a
/// thread timestamp, Telegram reads `reply_to_id` as a numeric message id
/// and `thread_id` as a forum topic, WhatsApp only honors `account_id`.
/// Adapters ignore fields their platform has no equivalent for.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SendOptions {
    /// Thread attachment (Slack `thread_ts`, Telegram `message_thread_id`).
    pub thread_id: Option<String>,
    /// Numeric "reply to message" id, for platforms that address by integer.
    pub reply_to_id: Option<i64>,
    /// Media attachment URL. One send per media item.
    pub media_url: Option<String>,
    /// Account/session identifier for multi-account adapters.
    pub account_id: Option<String>,
    pub verbose: bool,
}

/// Uniform send contract every platform adapter implements.
///
/// Test doubles implement the same trait; there is no runtime patching.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    /// Deliver one message. May suspend on network I/O and fail with a
    /// transport error; the router does not retry.
    async fn send(&self, to: &str, text: &str, options: &SendOptions) -> Result<SentMessage>;
}
