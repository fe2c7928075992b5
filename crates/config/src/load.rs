//! Minimal TOML loader for [`SwitchboardConfig`].
//!
//! The full configuration surface (env substitution, includes, migrations)
//! lives outside the core; this is just enough to build a snapshot from a
//! file or an inline string.

use std::path::Path;

use tracing::debug;

use crate::schema::SwitchboardConfig;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parse a configuration snapshot from a TOML string.
pub fn from_toml_str(raw: &str) -> Result<SwitchboardConfig> {
    let cfg: SwitchboardConfig = toml::from_str(raw)?;
    debug!(
        agents = cfg.agents.list.len(),
        bindings = cfg.bindings.len(),
        "parsed config snapshot"
    );
    Ok(cfg)
}

/// Read and parse a configuration snapshot from a TOML file.
pub fn from_path(path: &Path) -> Result<SwitchboardConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.display().to_string(),
        source,
    })?;
    from_toml_str(&raw)
}
