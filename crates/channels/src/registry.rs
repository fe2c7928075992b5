use std::{collections::HashMap, sync::Arc};

use crate::plugin::ChannelOutbound;

#[cfg(feature = "metrics")]
use switchboard_metrics::gauge;

/// Registry of provider adapters, keyed by channel name ("slack",
/// "telegram", ...). Built once at startup; read-only afterwards.
#[derive(Default)]
pub struct ChannelRegistry {
    adapters: HashMap<String, Arc<dyn ChannelOutbound>>,
}

impl ChannelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, channel: impl Into<String>, adapter: Arc<dyn ChannelOutbound>) {
        self.adapters.insert(channel.into(), adapter);
        #[cfg(feature = "metrics")]
        gauge!("switchboard_channels_registered").set(self.adapters.len() as f64);
    }

    #[must_use]
    pub fn get(&self, channel: &str) -> Option<Arc<dyn ChannelOutbound>> {
        self.adapters.get(channel).cloned()
    }

    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }
}
