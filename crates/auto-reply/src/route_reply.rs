//! Outbound reply router: normalize a reply payload and dispatch it to the
//! adapter registered for the destination channel.

use std::sync::Arc;

use {
    switchboard_channels::{ChannelRegistry, Error as ChannelError, SendOptions},
    switchboard_config::SwitchboardConfig,
    switchboard_routing::resolve_response_prefix,
    tokio_util::sync::CancellationToken,
    tracing::{debug, warn},
};

use crate::{Error, Result, tokens::SILENT_REPLY_TOKEN};

#[cfg(feature = "metrics")]
use switchboard_metrics::{counter, labels, router as router_metrics};

use switchboard_common::types::ReplyPayload;

/// One outbound routing request.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub payload: ReplyPayload,
    /// Destination channel name ("slack", "telegram", ...).
    pub channel: String,
    /// Platform destination id (channel id, chat id, phone number).
    pub to: String,
    /// Routed agent, for the audit trail only. Branding never derives from
    /// it here; only the explicit response-prefix override applies.
    pub agent_id: Option<String>,
    /// Thread attachment decided by the pipeline's reply-to mode.
    pub thread_id: Option<String>,
    pub account_id: Option<String>,
    pub cancel: CancellationToken,
}

impl RouteRequest {
    #[must_use]
    pub fn new(payload: ReplyPayload, channel: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            payload,
            channel: channel.into(),
            to: to.into(),
            agent_id: None,
            thread_id: None,
            account_id: None,
            cancel: CancellationToken::new(),
        }
    }
}

/// How a payload's `reply_to_id` maps onto the target platform's addressing.
enum ReplyToTarget {
    /// Platforms that thread by opaque timestamp-style ids (Slack, Teams).
    Thread(String),
    /// Platforms that reply by integer message id (Telegram, Discord, ...).
    Numeric(i64),
    Ignored,
}

fn classify_reply_to(channel: &str, raw: &str) -> ReplyToTarget {
    match channel {
        "slack" | "msteams" => ReplyToTarget::Thread(raw.to_string()),
        _ => {
            if let Ok(id) = raw.parse::<i64>() {
                ReplyToTarget::Numeric(id)
            } else if is_timestamp_style(raw) {
                ReplyToTarget::Thread(raw.to_string())
            } else {
                ReplyToTarget::Ignored
            }
        },
    }
}

/// Slack-style thread stamp: `<digits>.<digits>`.
fn is_timestamp_style(raw: &str) -> bool {
    match raw.split_once('.') {
        Some((secs, frac)) => {
            !secs.is_empty()
                && !frac.is_empty()
                && secs.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        },
        None => false,
    }
}

/// Dispatches normalized reply payloads to provider adapters.
pub struct ReplyRouter {
    cfg: Arc<SwitchboardConfig>,
    registry: Arc<ChannelRegistry>,
}

impl ReplyRouter {
    #[must_use]
    pub fn new(cfg: Arc<SwitchboardConfig>, registry: Arc<ChannelRegistry>) -> Self {
        Self { cfg, registry }
    }

    /// Route one reply payload.
    ///
    /// No-ops successfully on empty/silent payloads. Refuses immediately,
    /// without contacting any adapter, when the abort signal is already set.
    /// Payloads with N media URLs produce exactly N adapter sends, in order,
    /// with the text as caption on the first send only.
    pub async fn route(&self, request: RouteRequest) -> Result<()> {
        if request.cancel.is_cancelled() {
            #[cfg(feature = "metrics")]
            counter!(router_metrics::ABORTED_TOTAL, labels::CHANNEL => request.channel.clone())
                .increment(1);
            return Err(Error::Aborted);
        }

        let payload = &request.payload;
        let text = payload.text.as_deref().unwrap_or_default().to_string();
        if payload.is_empty() || text.trim() == SILENT_REPLY_TOKEN {
            debug!(channel = %request.channel, to = %request.to, "skipping empty/silent reply");
            #[cfg(feature = "metrics")]
            counter!(router_metrics::SILENT_DROPS_TOTAL, labels::CHANNEL => request.channel.clone())
                .increment(1);
            return Ok(());
        }

        let adapter = self
            .registry
            .get(&request.channel)
            .ok_or_else(|| ChannelError::unknown_channel(&request.channel))?;

        // Only the explicit config override applies here; the routed agent's
        // identity never leaks into the response prefix.
        let text = match resolve_response_prefix(&self.cfg) {
            Some(prefix) if !text.is_empty() => format!("{prefix} {text}"),
            _ => text,
        };

        let mut options = SendOptions {
            thread_id: request.thread_id.clone(),
            reply_to_id: None,
            media_url: None,
            account_id: request.account_id.clone(),
            verbose: false,
        };
        if let Some(raw) = payload.reply_to_id.as_deref() {
            match classify_reply_to(&request.channel, raw) {
                ReplyToTarget::Thread(thread) => options.thread_id = Some(thread),
                ReplyToTarget::Numeric(id) => options.reply_to_id = Some(id),
                ReplyToTarget::Ignored => {
                    warn!(
                        channel = %request.channel,
                        reply_to_id = raw,
                        "reply_to_id not addressable on this platform; ignoring"
                    );
                },
            }
        }

        let result = if payload.media_urls.is_empty() {
            self.dispatch(adapter.as_ref(), &request, &text, &options).await
        } else {
            self.dispatch_media(adapter.as_ref(), &request, &text, options).await
        };

        #[cfg(feature = "metrics")]
        if result.is_err() {
            counter!(router_metrics::SEND_ERRORS_TOTAL, labels::CHANNEL => request.channel.clone())
                .increment(1);
        }
        result
    }

    async fn dispatch(
        &self,
        adapter: &dyn switchboard_channels::ChannelOutbound,
        request: &RouteRequest,
        text: &str,
        options: &SendOptions,
    ) -> Result<()> {
        debug!(
            channel = %request.channel,
            to = %request.to,
            thread_id = ?options.thread_id,
            media = ?options.media_url,
            "dispatching reply send"
        );
        adapter.send(&request.to, text, options).await?;
        #[cfg(feature = "metrics")]
        counter!(router_metrics::SENDS_TOTAL, labels::CHANNEL => request.channel.clone())
            .increment(1);
        Ok(())
    }

    /// One send per media URL, in order; only the first carries the caption.
    /// Threading/account options replicate unchanged across every send.
    async fn dispatch_media(
        &self,
        adapter: &dyn switchboard_channels::ChannelOutbound,
        request: &RouteRequest,
        text: &str,
        options: SendOptions,
    ) -> Result<()> {
        for (index, url) in request.payload.media_urls.iter().enumerate() {
            let caption = if index == 0 { text } else { "" };
            let options = SendOptions {
                media_url: Some(url.clone()),
                ..options.clone()
            };
            self.dispatch(adapter, request, caption, &options).await?;
        }
        Ok(())
    }
}
