use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bagit_types::paths::BAG_INFO_FILE;
use bagit_types::TagEncoding;

use crate::error::{BagInfoError, BagInfoResult};
use crate::reserved::{canonicalize, is_non_repeatable};
use crate::value::BagInfoValue;

/// Ordered `key -> value` metadata of one `bag-info.txt`.
///
/// Keys are compared exactly. A lookup also matches when the query
/// canonicalizes to a stored reserved name, so `contact-name` finds a
/// `Contact-Name` written by [`BagInfo::set`] but not a `Contact-name` read
/// from disk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BagInfo {
    entries: Vec<(String, BagInfoValue)>,
}

impl BagInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `bag-info.txt` text.
    ///
    /// `Key: value` lines keep the key's case. A line starting with
    /// whitespace continues the previous value after a single space.
    pub fn parse(text: &str) -> BagInfoResult<Self> {
        let mut info = Self::new();
        for line in text.split(['\r', '\n']) {
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with(char::is_whitespace) {
                match info.entries.last_mut().and_then(|(_, v)| v.last_mut()) {
                    Some(last) => {
                        last.push(' ');
                        last.push_str(line.trim());
                    }
                    None => tracing::warn!("bag-info continuation without a key: {line:?}"),
                }
                continue;
            }
            match line.split_once(':') {
                Some((key, value)) => info.push(key.trim(), value.trim())?,
                None => tracing::warn!("skipping bag-info line without a colon: {line:?}"),
            }
        }
        Ok(info)
    }

    /// Load `<root>/bag-info.txt`, or an empty store when it is absent.
    pub fn load(root: &Path, encoding: &TagEncoding) -> BagInfoResult<Self> {
        let path = root.join(BAG_INFO_FILE);
        match fs::read(&path) {
            Ok(bytes) => Self::parse(&encoding.decode(&bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(source) => Err(BagInfoError::Io { path, source }),
        }
    }

    /// Add a value under `key`, canonicalizing reserved names.
    ///
    /// A repeated key accumulates its values. Fails if `key` may not repeat
    /// and is already present in any case.
    pub fn set(&mut self, key: &str, value: &str) -> BagInfoResult<()> {
        self.push(&canonicalize(key), value.trim())
    }

    fn push(&mut self, key: &str, value: &str) -> BagInfoResult<()> {
        if is_non_repeatable(key) && self.entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(key)) {
            return Err(BagInfoError::DuplicateNonRepeatableField(key.to_string()));
        }
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => existing.push(value.to_string()),
            None => self
                .entries
                .push((key.to_string(), BagInfoValue::Scalar(value.to_string()))),
        }
        Ok(())
    }

    /// Replace every value of `key` with a single one.
    ///
    /// Used for computed fields such as `Payload-Oxum`.
    pub fn replace(&mut self, key: &str, value: &str) {
        let key = canonicalize(key);
        let value = BagInfoValue::Scalar(value.trim().to_string());
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key).or_else(|| {
            let canonical = canonicalize(key);
            self.entries.iter().position(|(k, _)| *k == canonical)
        })
    }

    pub fn get(&self, key: &str) -> Option<&BagInfoValue> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn has(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Remove `key` (exact case), returning its value.
    pub fn clear(&mut self, key: &str) -> Option<BagInfoValue> {
        let i = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(i).1)
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// Stored keys in first-seen order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BagInfoValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `Key: value` lines, one line per value of a repeated key.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            for v in value.values() {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(v);
                out.push('\n');
            }
        }
        out
    }

    /// Write `<root>/bag-info.txt`.
    pub fn write(&self, root: &Path, encoding: &TagEncoding) -> BagInfoResult<PathBuf> {
        let path = root.join(BAG_INFO_FILE);
        let bytes = encoding.encode(&self.serialize())?;
        fs::write(&path, bytes).map_err(|source| BagInfoError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
