use crate::ListFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configured remote feed: where to fetch it and how to decode it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlocklistUrl {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub format: ListFormat,
}

impl BlocklistUrl {
    pub fn new(name: impl Into<String>, url: impl Into<String>, format: ListFormat) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            format,
        }
    }
}

/// Load state of one remote feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSource {
    pub name: Arc<str>,
    pub url: Arc<str>,
    pub format: ListFormat,
    pub last_update: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub domain_count: usize,
}

impl ListSource {
    pub fn from_config(source: &BlocklistUrl) -> Self {
        Self {
            name: Arc::from(source.name.as_str()),
            url: Arc::from(source.url.as_str()),
            format: source.format,
            last_update: None,
            last_error: None,
            domain_count: 0,
        }
    }

    pub fn record_success(&mut self, domain_count: usize) {
        self.last_update = Some(Utc::now());
        self.last_error = None;
        self.domain_count = domain_count;
    }

    pub fn record_failure(&mut self, error: impl ToString) {
        self.last_error = Some(error.to_string());
    }

    pub fn is_healthy(&self) -> bool {
        self.last_error.is_none()
    }
}
