//! The Slack message pipeline: gate → session key → engine → route.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use {
    anyhow::Result,
    tokio::sync::mpsc,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use {
    switchboard_auto_reply::{
        ReplyContext, ReplyEngine, ReplyEvent, ReplyRouter, RouteRequest, reply_event_channel,
    },
    switchboard_channels::{
        GateDecision, PairingStore, evaluate_channel_gate, evaluate_dm_gate, gating,
    },
    switchboard_common::types::{InboundEvent, ReplyPayload},
    switchboard_config::{AckReactionScope, ReplyToMode, SwitchboardConfig},
    switchboard_routing::{resolve_ack_reaction, resolve_agent_id},
    switchboard_sessions::{LastRoute, SessionKey, SessionScope, SessionStore, is_thread_reply},
};

#[cfg(feature = "metrics")]
use switchboard_metrics::{counter, labels, pipeline as pipeline_metrics};

use crate::{
    CHANNEL,
    client::{BotIdentity, SlackClient},
    events::{SlackMessageEvent, normalize},
};

const TYPING_STATUS: &str = "is typing...";
const THREAD_STARTER_MAX_CHARS: usize = 400;

/// Long-lived Slack listener. One instance per connection; events are
/// handled one at a time in arrival order, so per-conversation side effects
/// (ack, typing, replies) keep their order.
pub struct SlackMonitor<C> {
    cfg: Arc<SwitchboardConfig>,
    client: C,
    engine: Arc<dyn ReplyEngine>,
    router: Arc<ReplyRouter>,
    pairing: Arc<dyn PairingStore>,
    sessions: Arc<dyn SessionStore>,
    identity: BotIdentity,
    cancel: CancellationToken,
    /// Thread sessions already forked by this instance; starter context is
    /// fetched only on the first observation.
    forked_threads: Mutex<HashSet<String>>,
}

impl<C: SlackClient> SlackMonitor<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cfg: Arc<SwitchboardConfig>,
        client: C,
        engine: Arc<dyn ReplyEngine>,
        router: Arc<ReplyRouter>,
        pairing: Arc<dyn PairingStore>,
        sessions: Arc<dyn SessionStore>,
        identity: BotIdentity,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            client,
            engine,
            router,
            pairing,
            sessions,
            identity,
            cancel,
            forked_threads: Mutex::new(HashSet::new()),
        }
    }

    /// Consume raw events until the stream ends or the gateway is cancelled.
    /// Handler errors are logged and do not stop the listener.
    pub async fn run(&self, mut events: mpsc::Receiver<SlackMessageEvent>) {
        info!(bot_user = %self.identity.user_id, "slack monitor started");
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("slack monitor cancelled");
                    return;
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        info!("slack event stream closed");
                        return;
                    };
                    if let Err(e) = self.handle_event(event).await {
                        warn!(error = %e, "failed to handle slack event");
                    }
                }
            }
        }
    }

    /// Normalize and process one raw event.
    pub async fn handle_event(&self, event: SlackMessageEvent) -> Result<()> {
        match normalize(&event, &self.identity.user_id) {
            Some(inbound) => self.handle_message(inbound).await,
            None => Ok(()),
        }
    }

    async fn handle_message(&self, event: InboundEvent) -> Result<()> {
        if self.cancel.is_cancelled() {
            debug!(channel_id = %event.channel_id, "gateway shutting down; dropping event");
            return Ok(());
        }

        #[cfg(feature = "metrics")]
        counter!(pipeline_metrics::EVENTS_TOTAL, labels::CHANNEL => CHANNEL).increment(1);

        let peer = event.peer();
        let agent_id =
            resolve_agent_id(&self.cfg, CHANNEL, &peer, self.identity.team_id.as_deref())
                .to_string();

        // Access control gate.
        let mentioned = if event.is_direct_message {
            match self.dm_gate(&event).await {
                GateDecision::Allow => {},
                GateDecision::Pair => {
                    self.issue_pairing_code(&event).await?;
                    return Ok(());
                },
                GateDecision::Deny => {
                    debug!(sender = %event.sender_id, "dm blocked by policy");
                    #[cfg(feature = "metrics")]
                    counter!(pipeline_metrics::GATE_BLOCKED_TOTAL, labels::CHANNEL => CHANNEL)
                        .increment(1);
                    return Ok(());
                },
            }
            // DMs are implicitly addressed to the bot.
            true
        } else {
            let Some(channel_cfg) = evaluate_channel_gate(&self.cfg.slack, &event.channel_id)
            else {
                debug!(channel_id = %event.channel_id, "channel not allowed; dropping");
                #[cfg(feature = "metrics")]
                counter!(pipeline_metrics::GATE_BLOCKED_TOTAL, labels::CHANNEL => CHANNEL)
                    .increment(1);
                return Ok(());
            };
            let mentioned = self.is_mentioned(&event.text);
            if channel_cfg.require_mention && !mentioned {
                debug!(channel_id = %event.channel_id, "no mention; dropping");
                #[cfg(feature = "metrics")]
                counter!(pipeline_metrics::MENTION_DROPPED_TOTAL, labels::CHANNEL => CHANNEL)
                    .increment(1);
                return Ok(());
            }
            mentioned
        };

        // Session key derivation, with thread forking.
        let scope = if event.is_direct_message {
            SessionScope::Main
        } else {
            SessionScope::channel(CHANNEL, &event.channel_id)
        };
        let root_key = SessionKey::root(&agent_id, &scope);
        let threaded = is_thread_reply(
            &event.message_id,
            event.thread_id.as_deref(),
            event.parent_user_id.as_deref(),
        );
        let thread_root = event
            .thread_id
            .clone()
            .unwrap_or_else(|| event.message_id.clone());
        let (session_key, parent_session_key) = if threaded {
            (root_key.thread(&thread_root), Some(root_key))
        } else {
            (root_key, None)
        };

        let (thread_starter_body, thread_label) = if threaded && self.fork_thread(&session_key) {
            self.fetch_thread_context(&event.channel_id, &thread_root)
                .await
        } else {
            (None, None)
        };

        // Ack reaction, before the engine runs.
        if self.ack_in_scope(&event, mentioned) {
            let reaction = resolve_ack_reaction(&self.cfg, &agent_id);
            if !reaction.is_empty()
                && let Err(e) = self
                    .client
                    .add_reaction(&event.channel_id, &event.message_id, &reaction)
                    .await
            {
                warn!(error = %e, "failed to add ack reaction");
            }
        }

        let reply_thread = self.reply_thread(&event, threaded);
        let ctx = ReplyContext {
            session_key: session_key.clone(),
            parent_session_key,
            thread_starter_body,
            thread_label,
            was_mentioned: mentioned,
            sender_id: event.sender_id.clone(),
            body: event.text.clone(),
        };

        // The engine streams Started/ToolResult events while composing; each
        // one is acted on immediately, strictly before the terminal reply.
        let (events_tx, mut events_rx) = reply_event_channel();
        let status_thread = thread_root.clone();
        let consumer = async {
            let mut typing = false;
            while let Some(reply_event) = events_rx.recv().await {
                match reply_event {
                    ReplyEvent::Started => {
                        typing = true;
                        self.set_status(&event.channel_id, &status_thread, TYPING_STATUS)
                            .await;
                    },
                    ReplyEvent::ToolResult(payload) => {
                        if let Err(e) = self
                            .route_outbound(payload, &event, reply_thread.clone(), &agent_id)
                            .await
                        {
                            warn!(error = %e, "failed to route tool result");
                        }
                    },
                }
            }
            typing
        };
        let (engine_result, typing) =
            tokio::join!(self.engine.get_reply(ctx, events_tx), consumer);
        if typing {
            self.set_status(&event.channel_id, &status_thread, "").await;
        }
        let final_payload = engine_result?;

        if let Some(payload) = final_payload {
            self.route_outbound(payload, &event, reply_thread, &agent_id)
                .await?;
            if let Err(e) = self
                .sessions
                .update_last_route(&session_key, LastRoute {
                    channel: CHANNEL.into(),
                    to: event.channel_id.clone(),
                    account_id: None,
                })
                .await
            {
                warn!(error = %e, session_key = %session_key, "failed to record last route");
            }
        }
        Ok(())
    }

    async fn dm_gate(&self, event: &InboundEvent) -> GateDecision {
        let store_allow = match self.pairing.read_allow_from_store(CHANNEL).await {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "pairing store read failed; treating as empty");
                Vec::new()
            },
        };
        evaluate_dm_gate(&self.cfg.slack.dm, &store_allow, &event.sender_id)
    }

    /// One pairing-code message per pairing lifecycle: the upsert is atomic,
    /// and an already-pending request sends nothing.
    async fn issue_pairing_code(&self, event: &InboundEvent) -> Result<()> {
        let request = self
            .pairing
            .upsert_pairing_request(CHANNEL, &event.sender_id)
            .await?;
        if !request.created {
            debug!(sender = %event.sender_id, "pairing request already pending");
            return Ok(());
        }
        #[cfg(feature = "metrics")]
        counter!(pipeline_metrics::PAIRING_ISSUED_TOTAL, labels::CHANNEL => CHANNEL).increment(1);
        let text = format!(
            "Hi! This bot only talks to paired users.\n\
             Your Slack user id: {}\n\
             Pairing code: {}\n\
             Share the code with the bot owner to finish pairing.",
            event.sender_id, request.code
        );
        let mut request = RouteRequest::new(ReplyPayload::text(text), CHANNEL, &event.channel_id);
        request.cancel = self.cancel.clone();
        self.router.route(request).await?;
        Ok(())
    }

    fn is_mentioned(&self, text: &str) -> bool {
        text.contains(&format!("<@{}>", self.identity.user_id))
            || gating::matches_mention_patterns(
                text,
                &self.cfg.messages.group_chat.mention_patterns,
            )
            || gating::is_control_command(text)
    }

    fn ack_in_scope(&self, event: &InboundEvent, mentioned: bool) -> bool {
        match self.cfg.messages.ack_reaction_scope {
            AckReactionScope::GroupMentions => !event.is_direct_message && mentioned,
            AckReactionScope::All => true,
            AckReactionScope::Off => false,
        }
    }

    /// First observation of a thread session wins the starter-context fetch.
    fn fork_thread(&self, session_key: &SessionKey) -> bool {
        let mut forked = self
            .forked_threads
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let new = forked.insert(session_key.as_str().to_string());
        #[cfg(feature = "metrics")]
        if new {
            counter!(pipeline_metrics::THREAD_FORKS_TOTAL, labels::CHANNEL => CHANNEL)
                .increment(1);
        }
        new
    }

    /// Best-effort fetch of the thread's originating message and a readable
    /// label. Missing history never fails the message.
    async fn fetch_thread_context(
        &self,
        channel_id: &str,
        thread_root: &str,
    ) -> (Option<String>, Option<String>) {
        let starter = match self.client.thread_replies(channel_id, thread_root).await {
            Ok(messages) => messages
                .first()
                .map(|m| truncate_chars(&m.text, THREAD_STARTER_MAX_CHARS)),
            Err(e) => {
                warn!(error = %e, channel_id, "failed to fetch thread starter");
                None
            },
        };
        let label = match self.client.conversation_info(channel_id).await {
            Ok(info) => {
                let name = info.name.unwrap_or_else(|| channel_id.to_string());
                Some(format!("Slack thread #{name}"))
            },
            Err(e) => {
                warn!(error = %e, channel_id, "failed to fetch conversation info");
                None
            },
        };
        (starter, label)
    }

    /// Thread attachment for outbound replies, per the reply-to mode. The
    /// engine's explicit `reply_to_id` overrides this inside the router.
    fn reply_thread(&self, event: &InboundEvent, threaded: bool) -> Option<String> {
        match self.cfg.slack.reply_to_mode {
            ReplyToMode::All => Some(
                event
                    .thread_id
                    .clone()
                    .unwrap_or_else(|| event.message_id.clone()),
            ),
            ReplyToMode::Off | ReplyToMode::First => {
                if threaded {
                    event.thread_id.clone()
                } else {
                    None
                }
            },
        }
    }

    async fn route_outbound(
        &self,
        payload: ReplyPayload,
        event: &InboundEvent,
        thread_id: Option<String>,
        agent_id: &str,
    ) -> switchboard_auto_reply::Result<()> {
        let mut request = RouteRequest::new(payload, CHANNEL, &event.channel_id);
        request.agent_id = Some(agent_id.to_string());
        request.thread_id = thread_id;
        request.cancel = self.cancel.clone();
        self.router.route(request).await
    }

    async fn set_status(&self, channel_id: &str, thread_ts: &str, status: &str) {
        if let Err(e) = self
            .client
            .set_thread_status(channel_id, thread_ts, status)
            .await
        {
            warn!(error = %e, channel_id, "failed to set thread status");
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push('…');
    truncated
}
