pub mod errors;
pub mod logging;
pub mod policy;
pub mod root;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use policy::{PolicyConfig, RefreshMode, DEFAULT_FETCH_TIMEOUT_SECS};
pub use root::{CliOverrides, Config};
