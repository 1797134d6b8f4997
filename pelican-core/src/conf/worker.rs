use crate::auth::Credentials;
use crate::conf::{ConfigError, load_toml};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerConfig {
    pub supervisor: SupervisorEndpoint,
    pub flush: FlushSection,
    pub matcher: MatcherSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SupervisorEndpoint {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl Default for SupervisorEndpoint {
    fn default() -> Self {
        let creds = Credentials::default();
        Self {
            url: "http://127.0.0.1:1525".to_owned(),
            username: creds.username,
            password: creds.password,
        }
    }
}

impl SupervisorEndpoint {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlushSection {
    pub tick_ms: u64,
    pub timeout_ms: u64,
}

impl Default for FlushSection {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            timeout_ms: 2000,
        }
    }
}

impl FlushSection {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatcherSection {
    /// Lines matching this also count toward the error metric.
    pub error_pattern: String,

    /// How often the filter list is re-fetched from the supervisor.
    pub refresh_secs: u64,
}

impl Default for MatcherSection {
    fn default() -> Self {
        Self {
            error_pattern: r"(?i)\b(error|fatal|exception)\b".to_owned(),
            refresh_secs: 30,
        }
    }
}

impl MatcherSection {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn compile(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.error_pattern)
            .map_err(|e| ConfigError::invalid("matcher.error_pattern", e.to_string()))
    }
}

impl WorkerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = load_toml(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match url::Url::parse(&self.supervisor.url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            Ok(u) => {
                return Err(ConfigError::invalid(
                    "supervisor.url",
                    format!("unsupported scheme '{}'", u.scheme()),
                ));
            }
            Err(e) => return Err(ConfigError::invalid("supervisor.url", e.to_string())),
        }
        if self.supervisor.username.is_empty() || self.supervisor.password.is_empty() {
            return Err(ConfigError::invalid(
                "supervisor",
                "username and password are required",
            ));
        }
        if self.flush.tick_ms == 0 {
            return Err(ConfigError::invalid("flush.tick_ms", "must be greater than zero"));
        }
        if self.flush.timeout_ms == 0 {
            return Err(ConfigError::invalid("flush.timeout_ms", "must be greater than zero"));
        }
        if self.matcher.refresh_secs == 0 {
            return Err(ConfigError::invalid(
                "matcher.refresh_secs",
                "must be greater than zero",
            ));
        }
        self.matcher.compile()?;
        Ok(())
    }
}
