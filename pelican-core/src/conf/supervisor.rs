use crate::auth::Credentials;
use crate::conf::{ConfigError, load_toml};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SupervisorConfig {
    pub server: ServerSection,
    pub auth: Credentials,
    pub store: StoreSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// e.g. "0.0.0.0:1525"
    pub listen: String,

    /// Pingora worker threads; pingora's default when unset.
    pub threads: Option<usize>,

    pub pid_file: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:1525".to_owned(),
            threads: None,
            pid_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    /// Registry is memory-only when unset.
    pub snapshot_path: Option<PathBuf>,
    pub snapshot_interval_secs: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            snapshot_interval_secs: 30,
        }
    }
}

impl StoreSection {
    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.snapshot_interval_secs)
    }
}

impl SupervisorConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = load_toml(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = self.server.listen.parse::<SocketAddr>() {
            return Err(ConfigError::invalid(
                "server.listen",
                format!("'{}' is not a socket address: {e}", self.server.listen),
            ));
        }
        if self.server.threads == Some(0) {
            return Err(ConfigError::invalid("server.threads", "must be at least 1"));
        }
        if self.auth.username.is_empty() || self.auth.password.is_empty() {
            return Err(ConfigError::invalid("auth", "username and password are required"));
        }
        if self.store.snapshot_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "store.snapshot_interval_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
