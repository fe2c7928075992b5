//! Pairing-store contract and an in-memory implementation.
//!
//! Pairing is the access-control flow for unknown DM peers: the first
//! message creates a pending request with a generated code, later messages
//! from the same peer are idempotent no-ops until the peer completes
//! pairing out of band.

use std::{
    collections::HashMap,
    sync::Mutex,
};

use {
    anyhow::Result,
    async_trait::async_trait,
    rand::{Rng, distr::Alphanumeric},
    serde::Serialize,
    tracing::info,
};

const PAIRING_CODE_LEN: usize = 8;

/// Result of upserting a pairing request. `created == false` means a request
/// for this peer was already pending; callers must not re-notify.
#[derive(Debug, Clone, Serialize)]
pub struct PairingRequest {
    pub peer_id: String,
    pub code: String,
    pub created: bool,
}

/// External pairing/allow-list store. May be shared across provider
/// instances; `upsert_pairing_request` must behave as an atomic upsert so
/// only one request per peer reports `created == true`.
#[async_trait]
pub trait PairingStore: Send + Sync {
    async fn upsert_pairing_request(&self, provider: &str, peer_id: &str)
    -> Result<PairingRequest>;

    /// Peer ids approved through completed pairing for this provider.
    async fn read_allow_from_store(&self, provider: &str) -> Result<Vec<String>>;
}

#[derive(Default)]
struct PairingTables {
    /// (provider, peer) → pending code.
    pending: HashMap<(String, String), String>,
    /// provider → approved peer ids.
    approved: HashMap<String, Vec<String>>,
}

/// In-memory store for tests and single-process embedding. The mutex makes
/// the upsert atomic under concurrent access.
#[derive(Default)]
pub struct MemoryPairingStore {
    tables: Mutex<PairingTables>,
}

impl MemoryPairingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete pairing: match a pending code, move the peer onto the allow
    /// list. Returns the approved peer id.
    pub fn approve(&self, provider: &str, code: &str) -> Option<String> {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let key = tables
            .pending
            .iter()
            .find(|((p, _), pending_code)| p == provider && pending_code.as_str() == code)
            .map(|(key, _)| key.clone())?;
        tables.pending.remove(&key);
        let (_, peer_id) = key;
        tables
            .approved
            .entry(provider.to_string())
            .or_default()
            .push(peer_id.clone());
        info!(provider, peer_id = %peer_id, "pairing approved");
        Some(peer_id)
    }

    fn generate_code() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(PAIRING_CODE_LEN)
            .map(char::from)
            .collect::<String>()
            .to_uppercase()
    }
}

#[async_trait]
impl PairingStore for MemoryPairingStore {
    async fn upsert_pairing_request(
        &self,
        provider: &str,
        peer_id: &str,
    ) -> Result<PairingRequest> {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let key = (provider.to_string(), peer_id.to_string());
        if let Some(code) = tables.pending.get(&key) {
            return Ok(PairingRequest {
                peer_id: peer_id.to_string(),
                code: code.clone(),
                created: false,
            });
        }
        let code = Self::generate_code();
        tables.pending.insert(key, code.clone());
        info!(provider, peer_id, "pairing request created");
        Ok(PairingRequest {
            peer_id: peer_id.to_string(),
            code,
            created: true,
        })
    }

    async fn read_allow_from_store(&self, provider: &str) -> Result<Vec<String>> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        Ok(tables.approved.get(provider).cloned().unwrap_or_default())
    }
}
