use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Blocklist fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Blocklist source {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode blocklist: {0}")]
    DecodeError(String),

    #[error("All {0} blocklist sources failed to load")]
    AllSourcesFailed(usize),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Evaluation cancelled")]
    Cancelled,

    #[error("Evaluation deadline exceeded")]
    DeadlineExceeded,

    #[error("No async runtime available to start background tasks")]
    RuntimeUnavailable,
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::InvalidData => DomainError::DecodeError(e.to_string()),
            _ => DomainError::IoError(e.to_string()),
        }
    }
}
