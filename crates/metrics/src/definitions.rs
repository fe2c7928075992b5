//! Metric name and label definitions.
//!
//! Centralizing names keeps dashboards stable across crates.

/// Outbound reply router metrics
pub mod router {
    /// Total adapter sends issued by the router
    pub const SENDS_TOTAL: &str = "switchboard_router_sends_total";
    /// Total routes dropped as empty/silent no-ops
    pub const SILENT_DROPS_TOTAL: &str = "switchboard_router_silent_drops_total";
    /// Total routes refused because the abort signal was already set
    pub const ABORTED_TOTAL: &str = "switchboard_router_aborted_total";
    /// Total adapter send failures surfaced to callers
    pub const SEND_ERRORS_TOTAL: &str = "switchboard_router_send_errors_total";
}

/// Inbound pipeline metrics
pub mod pipeline {
    /// Total inbound events accepted after normalization
    pub const EVENTS_TOTAL: &str = "switchboard_pipeline_events_total";
    /// Total messages dropped by the access-control gate
    pub const GATE_BLOCKED_TOTAL: &str = "switchboard_pipeline_gate_blocked_total";
    /// Total messages dropped by mention gating
    pub const MENTION_DROPPED_TOTAL: &str = "switchboard_pipeline_mention_dropped_total";
    /// Total pairing codes issued
    pub const PAIRING_ISSUED_TOTAL: &str = "switchboard_pipeline_pairing_issued_total";
    /// Total thread sessions forked
    pub const THREAD_FORKS_TOTAL: &str = "switchboard_pipeline_thread_forks_total";
}

/// Common label keys
pub mod labels {
    pub const CHANNEL: &str = "channel";
    pub const AGENT: &str = "agent";
}
