use crate::Action;
use serde::Serialize;

pub const WHITELIST_NAME: &str = "whitelist";
pub const BLACKLIST_NAME: &str = "blacklist";

/// Outcome of one policy evaluation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PolicyResult {
    pub action: Action,
    /// Normalized name that matched a list, empty when no list matched.
    pub rule: String,
    /// `"whitelist"`, `"blacklist"` or empty.
    pub list_name: &'static str,
}

impl PolicyResult {
    pub fn allow() -> Self {
        Self::default()
    }

    pub fn whitelisted(rule: String) -> Self {
        Self {
            action: Action::Allow,
            rule,
            list_name: WHITELIST_NAME,
        }
    }

    pub fn blacklisted(action: Action, rule: String) -> Self {
        Self {
            action,
            rule,
            list_name: BLACKLIST_NAME,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PolicyStats {
    pub queries_total: u64,
    pub queries_blocked: u64,
    pub queries_allowed: u64,
    pub whitelist_size: usize,
    pub blacklist_size: usize,
    pub enabled: bool,
}
