//! Reply-engine contract.
//!
//! The engine is an external collaborator (the LLM runtime). It receives a
//! session-keyed context and a sender for intermediate events; every event
//! it emits is routed outbound before its terminal payload, in emit order.

use {
    async_trait::async_trait,
    switchboard_common::types::ReplyPayload,
    switchboard_sessions::SessionKey,
    tokio::sync::mpsc,
};

/// Buffer for in-flight intermediate events per engine invocation.
const REPLY_EVENT_BUFFER: usize = 16;

/// Context handed to the reply engine for one inbound message.
#[derive(Debug, Clone)]
pub struct ReplyContext {
    pub session_key: SessionKey,
    /// Root key of the forked thread session, when threaded.
    pub parent_session_key: Option<SessionKey>,
    /// Originating message of the thread, fetched on first fork.
    pub thread_starter_body: Option<String>,
    /// Human-readable thread label (includes the conversation display name).
    pub thread_label: Option<String>,
    pub was_mentioned: bool,
    pub sender_id: String,
    pub body: String,
}

/// Signals emitted by the engine before its terminal reply.
#[derive(Debug, Clone)]
pub enum ReplyEvent {
    /// The engine started composing; pipelines show a working indicator.
    Started,
    /// An intermediate tool result to deliver immediately.
    ToolResult(ReplyPayload),
}

pub type ReplyEventSender = mpsc::Sender<ReplyEvent>;
pub type ReplyEventReceiver = mpsc::Receiver<ReplyEvent>;

/// Channel pair for one engine invocation. The engine drops the sender when
/// it returns, which closes the receiver after the last buffered event.
#[must_use]
pub fn reply_event_channel() -> (ReplyEventSender, ReplyEventReceiver) {
    mpsc::channel(REPLY_EVENT_BUFFER)
}

/// The reply-generation engine. Returns `None` when the engine chooses not
/// to answer at all.
#[async_trait]
pub trait ReplyEngine: Send + Sync {
    async fn get_reply(
        &self,
        ctx: ReplyContext,
        events: ReplyEventSender,
    ) -> anyhow::Result<Option<ReplyPayload>>;
}
