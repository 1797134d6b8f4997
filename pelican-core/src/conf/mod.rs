mod error;
mod supervisor;
mod worker;

#[cfg(test)]
mod tests;

pub use error::ConfigError;
pub use supervisor::{ServerSection, StoreSection, SupervisorConfig};
pub use worker::{FlushSection, MatcherSection, SupervisorEndpoint, WorkerConfig};

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read and parse a TOML config file. Validation is left to the caller.
pub(crate) fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    toml::from_str(&contents).map_err(|e| ConfigError::parse(path, e))
}
