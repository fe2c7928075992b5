//! Pipeline behavior end to end: gating, session keys, engine hand-off,
//! and outbound routing, against fake collaborators.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use {
    async_trait::async_trait,
    tokio::sync::mpsc,
    tokio_util::sync::CancellationToken,
};

use {
    switchboard_auto_reply::{
        ReplyContext, ReplyEngine, ReplyEvent, ReplyEventSender, ReplyRouter,
    },
    switchboard_channels::{
        ChannelOutbound, ChannelRegistry, MemoryPairingStore, SendOptions,
    },
    switchboard_common::types::{ReplyPayload, SentMessage},
    switchboard_config::{
        AgentConfig, AgentIdentity, AgentsConfig, Binding, BindingMatch, ChannelConfig, DmConfig,
        DmPolicy, GroupChatConfig, MessagesConfig, ProviderConfig, ReplyToMode, SwitchboardConfig,
    },
    switchboard_sessions::{MemorySessionStore, SessionKey, SessionScope},
    switchboard_slack::{
        BotIdentity, ConversationInfo, SlackClient, SlackMessageEvent, SlackMonitor, ThreadMessage,
    },
};

#[derive(Default)]
struct FakeSlackState {
    channel_name: Option<String>,
    thread_starter: Option<String>,
    reactions: Vec<(String, String, String)>,
    statuses: Vec<(String, String, String)>,
    thread_fetches: usize,
}

#[derive(Clone, Default)]
struct FakeSlackClient {
    state: Arc<Mutex<FakeSlackState>>,
}

#[async_trait]
impl SlackClient for FakeSlackClient {
    async fn conversation_info(&self, _channel_id: &str) -> switchboard_common::Result<ConversationInfo> {
        let state = self.state.lock().unwrap();
        Ok(ConversationInfo {
            name: state.channel_name.clone(),
            is_im: false,
        })
    }

    async fn thread_replies(
        &self,
        _channel_id: &str,
        thread_ts: &str,
    ) -> switchboard_common::Result<Vec<ThreadMessage>> {
        let mut state = self.state.lock().unwrap();
        state.thread_fetches += 1;
        Ok(state
            .thread_starter
            .iter()
            .map(|text| ThreadMessage {
                user: Some("U9".into()),
                text: text.clone(),
                ts: thread_ts.to_string(),
            })
            .collect())
    }

    async fn add_reaction(
        &self,
        channel_id: &str,
        message_ts: &str,
        name: &str,
    ) -> switchboard_common::Result<()> {
        self.state.lock().unwrap().reactions.push((
            channel_id.to_string(),
            message_ts.to_string(),
            name.to_string(),
        ));
        Ok(())
    }

    async fn set_thread_status(
        &self,
        channel_id: &str,
        thread_ts: &str,
        status: &str,
    ) -> switchboard_common::Result<()> {
        self.state.lock().unwrap().statuses.push((
            channel_id.to_string(),
            thread_ts.to_string(),
            status.to_string(),
        ));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingAdapter {
    calls: Mutex<Vec<(String, String, SendOptions)>>,
}

impl RecordingAdapter {
    fn calls(&self) -> Vec<(String, String, SendOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelOutbound for RecordingAdapter {
    async fn send(
        &self,
        to: &str,
        text: &str,
        options: &SendOptions,
    ) -> switchboard_channels::Result<SentMessage> {
        self.calls
            .lock()
            .unwrap()
            .push((to.to_string(), text.to_string(), options.clone()));
        Ok(SentMessage {
            message_id: "sent-1".into(),
            channel_id: Some(to.to_string()),
        })
    }
}

/// Engine double that replays a fixed event script and terminal reply,
/// recording every context it was invoked with.
#[derive(Default)]
struct ScriptedEngine {
    events: Vec<ReplyEvent>,
    reply: Option<ReplyPayload>,
    contexts: Mutex<Vec<ReplyContext>>,
}

impl ScriptedEngine {
    fn replying(text: &str) -> Self {
        Self {
            reply: Some(ReplyPayload::text(text)),
            ..Self::default()
        }
    }

    fn contexts(&self) -> Vec<ReplyContext> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplyEngine for ScriptedEngine {
    async fn get_reply(
        &self,
        ctx: ReplyContext,
        events: ReplyEventSender,
    ) -> anyhow::Result<Option<ReplyPayload>> {
        self.contexts.lock().unwrap().push(ctx);
        for event in &self.events {
            events.send(event.clone()).await?;
        }
        Ok(self.reply.clone())
    }
}

struct Harness {
    monitor: Arc<SlackMonitor<FakeSlackClient>>,
    client: FakeSlackClient,
    adapter: Arc<RecordingAdapter>,
    engine: Arc<ScriptedEngine>,
    pairing: Arc<MemoryPairingStore>,
    sessions: Arc<MemorySessionStore>,
    cancel: CancellationToken,
}

fn harness(cfg: SwitchboardConfig, engine: ScriptedEngine) -> Harness {
    harness_as(cfg, engine, BotIdentity {
        user_id: "UBOT".into(),
        team_id: None,
    })
}

fn harness_as(cfg: SwitchboardConfig, engine: ScriptedEngine, identity: BotIdentity) -> Harness {
    let cfg = Arc::new(cfg);
    let client = FakeSlackClient::default();
    let adapter = Arc::new(RecordingAdapter::default());
    let mut registry = ChannelRegistry::new();
    registry.register("slack", adapter.clone());
    let router = Arc::new(ReplyRouter::new(cfg.clone(), Arc::new(registry)));
    let engine = Arc::new(engine);
    let pairing = Arc::new(MemoryPairingStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let cancel = CancellationToken::new();
    let monitor = Arc::new(SlackMonitor::new(
        cfg,
        client.clone(),
        engine.clone(),
        router,
        pairing.clone(),
        sessions.clone(),
        identity,
        cancel.clone(),
    ));
    Harness {
        monitor,
        client,
        adapter,
        engine,
        pairing,
        sessions,
        cancel,
    }
}

fn channel_message(text: &str) -> SlackMessageEvent {
    SlackMessageEvent {
        user: Some("U1".into()),
        bot_id: None,
        subtype: None,
        text: Some(text.into()),
        ts: "100.000".into(),
        thread_ts: None,
        parent_user_id: None,
        channel: "C1".into(),
        channel_type: Some("channel".into()),
    }
}

fn dm_message(text: &str) -> SlackMessageEvent {
    SlackMessageEvent {
        channel: "D1".into(),
        channel_type: Some("im".into()),
        ..channel_message(text)
    }
}

fn open_dm_config() -> SwitchboardConfig {
    SwitchboardConfig {
        slack: ProviderConfig {
            dm: DmConfig {
                policy: DmPolicy::Open,
                ..DmConfig::default()
            },
            ..ProviderConfig::default()
        },
        ..SwitchboardConfig::default()
    }
}

fn allowed_channel_config() -> SwitchboardConfig {
    let mut channels = HashMap::new();
    channels.insert("C1".to_string(), ChannelConfig {
        allow: true,
        require_mention: true,
    });
    SwitchboardConfig {
        slack: ProviderConfig {
            channels,
            ..ProviderConfig::default()
        },
        ..SwitchboardConfig::default()
    }
}

#[tokio::test]
async fn dm_replies_under_the_main_session() {
    let h = harness(open_dm_config(), ScriptedEngine::replying("hi there"));

    h.monitor.handle_event(dm_message("hello")).await.unwrap();

    let calls = h.adapter.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "D1");
    assert_eq!(calls[0].1, "hi there");

    let contexts = h.engine.contexts();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].session_key.as_str(), "agent:main:main");
    assert!(contexts[0].was_mentioned);

    let key = SessionKey::root("main", &SessionScope::Main);
    let route = h.sessions.last_route(&key).unwrap();
    assert_eq!(route.channel, "slack");
    assert_eq!(route.to, "D1");
}

#[tokio::test]
async fn tool_results_route_in_order_before_the_final_reply() {
    let cfg = SwitchboardConfig {
        messages: MessagesConfig {
            response_prefix: Some("[switchbot]".into()),
            ..MessagesConfig::default()
        },
        ..allowed_channel_config()
    };
    let engine = ScriptedEngine {
        events: vec![
            ReplyEvent::Started,
            ReplyEvent::ToolResult(ReplyPayload::text("Ran deploy-check")),
            ReplyEvent::ToolResult(ReplyPayload::text("Ran smoke-test")),
        ],
        ..ScriptedEngine::replying("all green")
    };
    let h = harness(cfg, engine);

    h.monitor
        .handle_event(channel_message("<@UBOT> deploy status?"))
        .await
        .unwrap();

    let texts: Vec<String> = h.adapter.calls().into_iter().map(|(_, t, _)| t).collect();
    assert_eq!(texts, vec![
        "[switchbot] Ran deploy-check",
        "[switchbot] Ran smoke-test",
        "[switchbot] all green",
    ]);
}

#[tokio::test]
async fn typing_status_is_set_then_cleared() {
    let engine = ScriptedEngine {
        events: vec![ReplyEvent::Started],
        ..ScriptedEngine::replying("done")
    };
    let h = harness(allowed_channel_config(), engine);

    h.monitor
        .handle_event(channel_message("<@UBOT> hi"))
        .await
        .unwrap();

    let statuses = h.client.state.lock().unwrap().statuses.clone();
    assert_eq!(statuses, vec![
        ("C1".to_string(), "100.000".to_string(), "is typing...".to_string()),
        ("C1".to_string(), "100.000".to_string(), String::new()),
    ]);
}

#[tokio::test]
async fn no_status_cleanup_without_a_reply_start() {
    let h = harness(allowed_channel_config(), ScriptedEngine::replying("done"));
    h.monitor
        .handle_event(channel_message("<@UBOT> hi"))
        .await
        .unwrap();
    assert!(h.client.state.lock().unwrap().statuses.is_empty());
}

#[tokio::test]
async fn mention_patterns_count_as_mentions() {
    let cfg = SwitchboardConfig {
        messages: MessagesConfig {
            group_chat: GroupChatConfig {
                mention_patterns: vec!["(?i)switchbot".into()],
            },
            ..MessagesConfig::default()
        },
        ..allowed_channel_config()
    };
    let h = harness(cfg, ScriptedEngine::replying("here"));

    h.monitor
        .handle_event(channel_message("hey Switchbot, around?"))
        .await
        .unwrap();

    assert_eq!(h.adapter.calls().len(), 1);
    assert!(h.engine.contexts()[0].was_mentioned);
}

#[tokio::test]
async fn control_commands_bypass_the_mention_gate() {
    let h = harness(allowed_channel_config(), ScriptedEngine::replying("ok"));
    h.monitor
        .handle_event(channel_message("/status now"))
        .await
        .unwrap();
    assert_eq!(h.adapter.calls().len(), 1);
}

#[tokio::test]
async fn unmentioned_channel_messages_are_dropped() {
    let h = harness(allowed_channel_config(), ScriptedEngine::replying("never"));
    h.monitor
        .handle_event(channel_message("just chatting"))
        .await
        .unwrap();
    assert!(h.adapter.calls().is_empty());
    assert!(h.engine.contexts().is_empty());
}

#[tokio::test]
async fn unlisted_channels_are_dropped_even_with_a_mention() {
    let h = harness(SwitchboardConfig::default(), ScriptedEngine::replying("never"));
    h.monitor
        .handle_event(channel_message("<@UBOT> hi"))
        .await
        .unwrap();
    assert!(h.adapter.calls().is_empty());
    assert!(h.engine.contexts().is_empty());
}

#[tokio::test]
async fn reply_mode_off_keeps_replies_unthreaded() {
    let h = harness(allowed_channel_config(), ScriptedEngine::replying("hi"));
    h.monitor
        .handle_event(channel_message("<@UBOT> hi"))
        .await
        .unwrap();
    assert_eq!(h.adapter.calls()[0].2.thread_id, None);
}

#[tokio::test]
async fn reply_mode_all_threads_under_the_incoming_message() {
    let mut cfg = allowed_channel_config();
    cfg.slack.reply_to_mode = ReplyToMode::All;
    let h = harness(cfg, ScriptedEngine::replying("hi"));

    h.monitor
        .handle_event(channel_message("<@UBOT> hi"))
        .await
        .unwrap();

    assert_eq!(h.adapter.calls()[0].2.thread_id.as_deref(), Some("100.000"));
}

#[tokio::test]
async fn reply_mode_first_keeps_root_replies_at_the_root() {
    let mut cfg = allowed_channel_config();
    cfg.slack.reply_to_mode = ReplyToMode::First;
    let h = harness(cfg, ScriptedEngine::replying("hi"));

    h.monitor
        .handle_event(channel_message("<@UBOT> hi"))
        .await
        .unwrap();

    assert_eq!(h.adapter.calls()[0].2.thread_id, None);
}

#[tokio::test]
async fn threaded_messages_stay_in_their_thread() {
    let h = harness(allowed_channel_config(), ScriptedEngine::replying("hi"));
    let event = SlackMessageEvent {
        thread_ts: Some("111.222".into()),
        ..channel_message("<@UBOT> hi")
    };

    h.monitor.handle_event(event).await.unwrap();

    assert_eq!(h.adapter.calls()[0].2.thread_id.as_deref(), Some("111.222"));
}

#[tokio::test]
async fn explicit_reply_to_overrides_the_thread_mode() {
    let engine = ScriptedEngine {
        reply: Some(ReplyPayload {
            reply_to_id: Some("555".into()),
            ..ReplyPayload::text("pinned")
        }),
        ..ScriptedEngine::default()
    };
    let h = harness(allowed_channel_config(), engine);

    h.monitor
        .handle_event(channel_message("<@UBOT> hi"))
        .await
        .unwrap();

    assert_eq!(h.adapter.calls()[0].2.thread_id.as_deref(), Some("555"));
}

#[tokio::test]
async fn team_bindings_scope_the_session_to_the_bound_agent() {
    let cfg = SwitchboardConfig {
        agents: AgentsConfig {
            list: vec![
                AgentConfig {
                    id: "main".into(),
                    is_default: true,
                    identity: None,
                },
                AgentConfig {
                    id: "support".into(),
                    is_default: false,
                    identity: None,
                },
            ],
        },
        bindings: vec![Binding {
            agent_id: "support".into(),
            rule: BindingMatch {
                provider: "slack".into(),
                peer: None,
                team_id: Some("T1".into()),
            },
        }],
        ..allowed_channel_config()
    };
    let h = harness_as(cfg, ScriptedEngine::replying("hi"), BotIdentity {
        user_id: "UBOT".into(),
        team_id: Some("T1".into()),
    });
    let event = SlackMessageEvent {
        thread_ts: Some("111.222".into()),
        ..channel_message("<@UBOT> hi")
    };

    h.monitor.handle_event(event).await.unwrap();

    let ctx = &h.engine.contexts()[0];
    assert_eq!(
        ctx.session_key.as_str(),
        "agent:support:slack:channel:C1:thread:111.222"
    );
    assert_eq!(
        ctx.parent_session_key.as_ref().unwrap().as_str(),
        "agent:support:slack:channel:C1"
    );
}

#[tokio::test]
async fn root_marked_replies_with_equal_ids_fork_a_thread_session() {
    let h = harness(allowed_channel_config(), ScriptedEngine::replying("hi"));
    let event = SlackMessageEvent {
        ts: "123".into(),
        thread_ts: Some("123".into()),
        parent_user_id: Some("U2".into()),
        ..channel_message("<@UBOT> hi")
    };

    h.monitor.handle_event(event).await.unwrap();

    assert_eq!(
        h.engine.contexts()[0].session_key.as_str(),
        "agent:main:slack:channel:C1:thread:123"
    );
}

#[tokio::test]
async fn thread_forks_carry_starter_context_and_a_label_once() {
    let h = harness(allowed_channel_config(), ScriptedEngine::replying("hi"));
    {
        let mut state = h.client.state.lock().unwrap();
        state.channel_name = Some("general".into());
        state.thread_starter = Some("What is the deploy status?".into());
    }
    let event = SlackMessageEvent {
        thread_ts: Some("111.222".into()),
        ..channel_message("<@UBOT> hi")
    };

    h.monitor.handle_event(event.clone()).await.unwrap();
    h.monitor.handle_event(event).await.unwrap();

    let contexts = h.engine.contexts();
    assert_eq!(contexts.len(), 2);
    assert_eq!(
        contexts[0].thread_starter_body.as_deref(),
        Some("What is the deploy status?")
    );
    assert_eq!(
        contexts[0].thread_label.as_deref(),
        Some("Slack thread #general")
    );
    // Starter context is fetched only when the thread session is first forked.
    assert_eq!(contexts[1].thread_starter_body, None);
    assert_eq!(h.client.state.lock().unwrap().thread_fetches, 1);
}

#[tokio::test]
async fn mentioned_channel_messages_get_an_ack_reaction() {
    let h = harness(allowed_channel_config(), ScriptedEngine::replying("hi"));
    h.monitor
        .handle_event(channel_message("<@UBOT> hi"))
        .await
        .unwrap();

    let reactions = h.client.state.lock().unwrap().reactions.clone();
    assert_eq!(reactions, vec![(
        "C1".to_string(),
        "100.000".to_string(),
        "👀".to_string()
    )]);
}

#[tokio::test]
async fn ack_reaction_uses_the_bound_agents_identity_emoji() {
    let cfg = SwitchboardConfig {
        agents: AgentsConfig {
            list: vec![AgentConfig {
                id: "main".into(),
                is_default: true,
                identity: Some(AgentIdentity {
                    name: Some("Switchbot".into()),
                    emoji: Some("🦉".into()),
                    theme: None,
                }),
            }],
        },
        ..allowed_channel_config()
    };
    let h = harness(cfg, ScriptedEngine::replying("hi"));

    h.monitor
        .handle_event(channel_message("<@UBOT> hi"))
        .await
        .unwrap();

    assert_eq!(h.client.state.lock().unwrap().reactions[0].2, "🦉");
}

#[tokio::test]
async fn dms_are_not_acked_under_the_default_scope() {
    let h = harness(open_dm_config(), ScriptedEngine::replying("hi"));
    h.monitor.handle_event(dm_message("hello")).await.unwrap();
    assert!(h.client.state.lock().unwrap().reactions.is_empty());
}

#[tokio::test]
async fn unknown_dm_peers_get_one_pairing_code() {
    let h = harness(SwitchboardConfig::default(), ScriptedEngine::replying("never"));

    h.monitor.handle_event(dm_message("hello")).await.unwrap();
    h.monitor.handle_event(dm_message("anyone?")).await.unwrap();

    // One notification per pairing lifecycle, engine never consulted.
    let calls = h.adapter.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].1.contains("Your Slack user id: U1"));
    assert!(calls[0].1.contains("Pairing code: "));
    assert!(h.engine.contexts().is_empty());
}

#[tokio::test]
async fn approved_peers_pass_the_pairing_gate() {
    let h = harness(SwitchboardConfig::default(), ScriptedEngine::replying("welcome"));

    h.monitor.handle_event(dm_message("hello")).await.unwrap();
    let code = h
        .adapter
        .calls()[0]
        .1
        .lines()
        .find_map(|line| line.strip_prefix("Pairing code: ").map(str::to_string))
        .unwrap();
    assert_eq!(h.pairing.approve("slack", &code).as_deref(), Some("U1"));

    h.monitor.handle_event(dm_message("hello again")).await.unwrap();

    let calls = h.adapter.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].1, "welcome");
    assert_eq!(h.engine.contexts().len(), 1);
}

#[tokio::test]
async fn disabled_dms_are_silently_ignored() {
    let mut cfg = SwitchboardConfig::default();
    cfg.slack.dm.enabled = false;
    let h = harness(cfg, ScriptedEngine::replying("never"));

    h.monitor.handle_event(dm_message("hello")).await.unwrap();

    assert!(h.adapter.calls().is_empty());
    assert!(h.engine.contexts().is_empty());
}

#[tokio::test]
async fn run_loop_processes_events_until_the_stream_closes() {
    let h = harness(open_dm_config(), ScriptedEngine::replying("hi"));
    let (tx, rx) = mpsc::channel(8);

    let monitor = h.monitor.clone();
    let task = tokio::spawn(async move { monitor.run(rx).await });

    tx.send(dm_message("hello")).await.unwrap();
    drop(tx);
    task.await.unwrap();

    assert_eq!(h.adapter.calls().len(), 1);
}

#[tokio::test]
async fn run_loop_stops_on_cancellation() {
    let h = harness(open_dm_config(), ScriptedEngine::replying("never"));
    let (_tx, rx) = mpsc::channel::<SlackMessageEvent>(8);

    let monitor = h.monitor.clone();
    let task = tokio::spawn(async move { monitor.run(rx).await });

    h.cancel.cancel();
    task.await.unwrap();

    assert!(h.adapter.calls().is_empty());
}
