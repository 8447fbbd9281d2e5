//! Ferrous Policy Domain Layer
pub mod action;
pub mod config;
pub mod domain_name;
pub mod errors;
pub mod list_format;
pub mod list_source;
pub mod policy;

pub use action::Action;
pub use config::{Config, ConfigError, LoggingConfig, PolicyConfig, RefreshMode};
pub use domain_name::{is_valid_domain, normalize_domain};
pub use errors::DomainError;
pub use list_format::ListFormat;
pub use list_source::{BlocklistUrl, ListSource};
pub use policy::{PolicyResult, PolicyStats, BLACKLIST_NAME, WHITELIST_NAME};
