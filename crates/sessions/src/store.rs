use std::{collections::HashMap, sync::Mutex};

use {anyhow::Result, async_trait::async_trait, serde::Serialize, tracing::debug};

use crate::key::SessionKey;

/// Most recent outbound destination for a session. Used for out-of-band
/// follow-up sends; never read by the routing decision itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastRoute {
    pub channel: String,
    pub to: String,
    pub account_id: Option<String>,
}

/// Persistent session bookkeeping. Implementations may be shared across
/// provider instances and must tolerate concurrent access.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn update_last_route(&self, session_key: &SessionKey, route: LastRoute) -> Result<()>;
}

/// In-memory store for tests and single-process embedding.
#[derive(Default)]
pub struct MemorySessionStore {
    routes: Mutex<HashMap<SessionKey, LastRoute>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last_route(&self, session_key: &SessionKey) -> Option<LastRoute> {
        self.routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(session_key)
            .cloned()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn update_last_route(&self, session_key: &SessionKey, route: LastRoute) -> Result<()> {
        debug!(session_key = %session_key, channel = %route.channel, "updating last route");
        self.routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(session_key.clone(), route);
        Ok(())
    }
}
