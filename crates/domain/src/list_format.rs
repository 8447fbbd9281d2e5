use serde::{Deserialize, Serialize};

/// Text format of a blocklist feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListFormat {
    /// One domain per line.
    Domains,
    /// `0.0.0.0 domain` / `127.0.0.1 domain`.
    Hosts,
    /// `||domain^` Adblock Plus network rules.
    Adblock,
    /// Guessed from the first non-comment line.
    #[default]
    Auto,
}

impl ListFormat {
    pub fn to_str(&self) -> &'static str {
        match self {
            ListFormat::Domains => "domains",
            ListFormat::Hosts => "hosts",
            ListFormat::Adblock => "adblock",
            ListFormat::Auto => "auto",
        }
    }
}

impl std::fmt::Display for ListFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

impl std::str::FromStr for ListFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "domains" | "domain" | "plain" => Ok(ListFormat::Domains),
            "hosts" => Ok(ListFormat::Hosts),
            "adblock" | "abp" => Ok(ListFormat::Adblock),
            "auto" | "" => Ok(ListFormat::Auto),
            other => Err(format!("unknown list format '{}'", other)),
        }
    }
}
