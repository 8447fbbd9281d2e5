use super::domain_trie::DomainTrie;
use ferrous_policy_domain::config::DEFAULT_FETCH_TIMEOUT_SECS;
use ferrous_policy_domain::{is_valid_domain, normalize_domain, DomainError, ListFormat};
use std::io::BufRead;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS);

const USER_AGENT: &str = "Ferrous-Policy/0.1 (blocklist-sync)";

const HOSTS_SINK_ADDRS: [&str; 2] = ["0.0.0.0", "127.0.0.1"];
const HOSTS_EXCLUDED: [&str; 2] = ["localhost", "localhost.localdomain"];

// ── Per-format line decoders ──────────────────────────────────────────────────

/// Comment and header lines, skipped in every format.
pub fn is_comment_line(line: &str) -> bool {
    line.starts_with('#') || line.starts_with('!') || line.starts_with('[')
}

/// Guesses the format from the first non-comment line.
pub fn detect_format(line: &str) -> ListFormat {
    if line.starts_with("||") {
        ListFormat::Adblock
    } else if HOSTS_SINK_ADDRS.iter().any(|addr| line.starts_with(addr)) {
        ListFormat::Hosts
    } else {
        ListFormat::Domains
    }
}

/// Extracts the candidate domain of one line, before validation.
///
/// `Auto` lines are decoded as plain domains; callers resolve `Auto` first.
pub fn decode_line(format: ListFormat, line: &str) -> Option<&str> {
    match format {
        ListFormat::Domains | ListFormat::Auto => decode_domains_line(line),
        ListFormat::Hosts => decode_hosts_line(line),
        ListFormat::Adblock => decode_adblock_line(line),
    }
}

fn strip_inline_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn decode_domains_line(line: &str) -> Option<&str> {
    let line = strip_inline_comment(line).trim();
    if line.is_empty() {
        return None;
    }
    Some(line)
}

fn decode_hosts_line(line: &str) -> Option<&str> {
    let line = strip_inline_comment(line);
    let mut fields = line.split_whitespace();
    let addr = fields.next()?;
    if !HOSTS_SINK_ADDRS.contains(&addr) {
        return None;
    }
    let host = fields.next()?;
    if HOSTS_EXCLUDED
        .iter()
        .any(|excluded| host.eq_ignore_ascii_case(excluded))
    {
        return None;
    }
    Some(host)
}

fn decode_adblock_line(line: &str) -> Option<&str> {
    let line = line.trim();

    if line.is_empty() || line.starts_with('!') || line.starts_with('[') {
        return None;
    }

    // Exception rules are skipped, never turned into allow entries.
    if line.starts_with("@@") {
        return None;
    }

    let inner = line.strip_prefix("||")?;
    let domain = match inner.find(['^', '$']) {
        Some(pos) => &inner[..pos],
        None => inner,
    };
    if domain.contains('/') || domain.contains('*') {
        return None;
    }
    Some(domain.trim())
}

// ── Parser ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseSummary {
    pub format: Option<ListFormat>,
    /// Non-blank, non-comment lines. Exception rules and hosts entries for
    /// loopback names count here but are neither accepted nor rejected.
    pub lines: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Decodes blocklist text into a [`DomainTrie`].
///
/// Transport and decode failures are returned; malformed entries are dropped
/// line by line. Every accepted entry is inserted as a wildcard, hosts lines
/// included.
#[derive(Clone)]
pub struct ListParser {
    client: reqwest::Client,
    timeout: Duration,
}

impl ListParser {
    pub fn new() -> Result<Self, DomainError> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::HttpClient(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn parse<R: BufRead>(reader: R, format: ListFormat) -> Result<DomainTrie, DomainError> {
        let trie = DomainTrie::new();
        Self::parse_into(reader, format, &trie)?;
        Ok(trie)
    }

    /// Streams `reader` into `trie`. `Auto` is resolved once, on the first
    /// non-comment line, and kept for the rest of the input.
    pub fn parse_into<R: BufRead>(
        reader: R,
        format: ListFormat,
        trie: &DomainTrie,
    ) -> Result<ParseSummary, DomainError> {
        let mut summary = ParseSummary {
            format: match format {
                ListFormat::Auto => None,
                explicit => Some(explicit),
            },
            ..ParseSummary::default()
        };

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = if idx == 0 {
                line.trim_start_matches('\u{feff}')
            } else {
                line.as_str()
            };
            let line = line.trim();
            if line.is_empty() || is_comment_line(line) {
                continue;
            }

            let format = match summary.format {
                Some(format) => format,
                None => {
                    let detected = detect_format(line);
                    debug!(format = %detected, "Detected blocklist format");
                    summary.format = Some(detected);
                    detected
                }
            };

            summary.lines += 1;
            let Some(candidate) = decode_line(format, line) else {
                continue;
            };
            let domain = normalize_domain(candidate);
            if !is_valid_domain(&domain) {
                summary.rejected += 1;
                continue;
            }
            trie.add(&domain, true);
            summary.accepted += 1;
        }

        debug!(
            format = ?summary.format,
            lines = summary.lines,
            accepted = summary.accepted,
            rejected = summary.rejected,
            "Blocklist parsed"
        );
        Ok(summary)
    }

    /// Validates and inserts an in-memory list, always as wildcards.
    pub fn parse_domains_slice<S: AsRef<str>>(domains: &[S]) -> DomainTrie {
        let trie = DomainTrie::new();
        for domain in domains {
            let domain = normalize_domain(domain.as_ref());
            if is_valid_domain(&domain) {
                trie.add(&domain, true);
            } else if !domain.is_empty() {
                debug!(domain = %domain, "Skipping invalid domain");
            }
        }
        trie
    }

    pub async fn parse_file(
        path: impl AsRef<Path>,
        format: ListFormat,
    ) -> Result<DomainTrie, DomainError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::parse(bytes.as_slice(), format)
    }

    pub async fn parse_url(&self, url: &str, format: ListFormat) -> Result<DomainTrie, DomainError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| DomainError::FetchFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DomainError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DomainError::FetchFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        info!(url = %url, bytes = body.len(), "Fetched blocklist source");
        Self::parse(body.as_ref(), format)
    }

    /// `http(s)://` locations are fetched, `file://` and bare paths are read
    /// from disk.
    pub async fn parse_source(
        &self,
        location: &str,
        format: ListFormat,
    ) -> Result<DomainTrie, DomainError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            self.parse_url(location, format).await
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            Self::parse_file(path, format).await
        }
    }
}
