//! Raw Slack message events and their normalization.

use {serde::Deserialize, switchboard_common::types::InboundEvent, tracing::trace};

/// A `message` push event as delivered by the transport. Field names follow
/// the Slack event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackMessageEvent {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub parent_user_id: Option<String>,
    pub channel: String,
    #[serde(default)]
    pub channel_type: Option<String>,
}

impl SlackMessageEvent {
    fn is_direct_message(&self) -> bool {
        self.channel_type.as_deref() == Some("im") || self.channel.starts_with('D')
    }
}

/// Normalize a raw event into the pipeline's [`InboundEvent`].
///
/// Returns `None` for events the pipeline ignores: bot echoes (including
/// the bot's own messages), message subtypes (edits, deletes), and events
/// without text.
#[must_use]
pub fn normalize(event: &SlackMessageEvent, bot_user_id: &str) -> Option<InboundEvent> {
    if event.bot_id.is_some() || event.subtype.is_some() {
        trace!(ts = %event.ts, "ignoring bot/subtype event");
        return None;
    }
    let sender_id = event.user.clone()?;
    if sender_id == bot_user_id {
        return None;
    }
    let text = event.text.clone().unwrap_or_default();
    if text.trim().is_empty() {
        return None;
    }
    Some(InboundEvent {
        sender_id,
        text,
        message_id: event.ts.clone(),
        channel_id: event.channel.clone(),
        thread_id: event.thread_ts.clone(),
        parent_user_id: event.parent_user_id.clone(),
        is_direct_message: event.is_direct_message(),
    })
}
