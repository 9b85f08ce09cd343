use std::fmt;

use bagit_types::paths::payload_path;
use serde::{Deserialize, Serialize};

/// Expected length of a fetched file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchSize {
    Known(u64),
    /// Written as `-`.
    #[default]
    Unknown,
}

impl FetchSize {
    /// Parse a size token: decimal digits or `-`.
    pub fn parse(token: &str) -> Option<Self> {
        if token == "-" {
            Some(Self::Unknown)
        } else if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            token.parse().ok().map(Self::Known)
        } else {
            None
        }
    }

    pub fn known(&self) -> Option<u64> {
        match self {
            Self::Known(n) => Some(*n),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for FetchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(n) => write!(f, "{n}"),
            Self::Unknown => f.write_str("-"),
        }
    }
}

/// One `url size path` line of `fetch.txt`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchEntry {
    pub url: String,
    pub size: FetchSize,
    /// Bag-relative target, always under `data/`.
    pub path: String,
}

impl FetchEntry {
    /// Create an entry, normalising `path` to a payload path.
    pub fn new(url: impl Into<String>, size: FetchSize, path: &str) -> Self {
        Self {
            url: url.into(),
            size,
            path: payload_path(path),
        }
    }
}

impl fmt::Display for FetchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.url, self.size, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_tokens() {
        assert_eq!(FetchSize::parse("-"), Some(FetchSize::Unknown));
        assert_eq!(FetchSize::parse("1024"), Some(FetchSize::Known(1024)));
        assert_eq!(FetchSize::parse("12kb"), None);
        assert_eq!(FetchSize::parse(""), None);
        assert_eq!(FetchSize::parse("99999999999999999999999"), None);
    }

    #[test]
    fn entry_path_gets_data_prefix() {
        let e = FetchEntry::new("http://example.org/a", FetchSize::Unknown, "google/index.html");
        assert_eq!(e.path, "data/google/index.html");
        assert_eq!(e.to_string(), "http://example.org/a - data/google/index.html");
    }
}
