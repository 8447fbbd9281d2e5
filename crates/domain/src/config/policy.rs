use crate::{Action, BlocklistUrl};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use super::errors::ConfigError;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// What a periodic refresh does with the static blacklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// Rebuild from remote sources only; static and runtime entries are dropped.
    #[default]
    Replace,
    /// Rebuild from remote sources plus the static blacklist.
    Reseed,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_block_action")]
    pub block_action: Action,

    #[serde(default)]
    pub log_blocked: bool,

    #[serde(default)]
    pub log_allowed: bool,

    #[serde(default)]
    pub whitelist_domains: Vec<String>,

    #[serde(default)]
    pub blacklist_domains: Vec<String>,

    #[serde(default)]
    pub blocklist_urls: Vec<BlocklistUrl>,

    /// Zero disables periodic refresh.
    #[serde(default)]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default)]
    pub refresh_mode: RefreshMode,
}

impl PolicyConfig {
    pub fn refresh_interval(&self) -> Option<Duration> {
        match self.refresh_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for source in &self.blocklist_urls {
            if source.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "blocklist source with url '{}' has an empty name",
                    source.url
                )));
            }
            if source.url.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "blocklist source '{}' has an empty url",
                    source.name
                )));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate blocklist source name '{}'",
                    source.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            block_action: default_block_action(),
            log_blocked: false,
            log_allowed: false,
            whitelist_domains: vec![],
            blacklist_domains: vec![],
            blocklist_urls: vec![],
            refresh_interval_secs: 0,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            refresh_mode: RefreshMode::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_block_action() -> Action {
    Action::Block
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}
