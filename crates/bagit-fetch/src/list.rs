use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bagit_types::paths::FETCH_FILE;
use bagit_types::TagEncoding;

use crate::entry::{FetchEntry, FetchSize};
use crate::error::{FetchError, FetchResult};

/// Ordered entries of `fetch.txt`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchList {
    entries: Vec<FetchEntry>,
}

impl FetchList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one line.
    ///
    /// Accepts `<url> <size|-> <path>` and the shorter `<url> <path>`.
    /// Returns `None` for blank lines, lines with a single field and lines
    /// whose only field after the URL is the `-` size marker.
    pub fn parse_line(line: &str) -> Option<FetchEntry> {
        let line = line.trim();
        let (url, rest) = line.split_once(char::is_whitespace)?;
        let rest = rest.trim_start();
        if rest.is_empty() || rest == "-" {
            return None;
        }
        let (size, path) = match rest.split_once(char::is_whitespace) {
            Some((token, path)) => match FetchSize::parse(token) {
                Some(size) => (size, path.trim_start()),
                None => (FetchSize::Unknown, rest),
            },
            None => (FetchSize::Unknown, rest),
        };
        Some(FetchEntry::new(url, size, path))
    }

    pub fn parse(text: &str) -> Self {
        let mut list = Self::new();
        for line in text.split(['\r', '\n']).filter(|l| !l.trim().is_empty()) {
            match Self::parse_line(line) {
                Some(entry) => list.entries.push(entry),
                None => tracing::warn!("skipping malformed fetch.txt line: {line:?}"),
            }
        }
        list
    }

    /// Load `<root>/fetch.txt`, or an empty list when it is absent.
    pub fn load(root: &Path, encoding: &TagEncoding) -> FetchResult<Self> {
        let path = root.join(FETCH_FILE);
        match fs::read(&path) {
            Ok(bytes) => Ok(Self::parse(&encoding.decode(&bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(source) => Err(FetchError::Io { path, source }),
        }
    }

    /// Append `entries`, or replace the list with them when `merge` is false.
    pub fn add_entries(&mut self, entries: impl IntoIterator<Item = FetchEntry>, merge: bool) {
        if !merge {
            self.entries.clear();
        }
        self.entries.extend(entries);
    }

    pub fn entries(&self) -> &[FetchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line per entry joined by `\n`, with no newline after the last.
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn write(&self, root: &Path, encoding: &TagEncoding) -> FetchResult<PathBuf> {
        let path = root.join(FETCH_FILE);
        let bytes = encoding.encode(&self.serialize())?;
        fs::write(&path, bytes).map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_dash_form() {
        let list = FetchList::parse(
            "http://www.google.com - data/google/index.html\n\
             http://www.yahoo.com - data/yahoo/index.html\n",
        );
        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[0].url, "http://www.google.com");
        assert_eq!(list.entries()[0].size, FetchSize::Unknown);
        assert_eq!(list.entries()[1].path, "data/yahoo/index.html");
    }

    #[test]
    fn parses_sized_and_two_field_forms() {
        let sized = FetchList::parse_line("http://x/a 42 data/a.bin").unwrap();
        assert_eq!(sized.size, FetchSize::Known(42));
        assert_eq!(sized.path, "data/a.bin");

        let short = FetchList::parse_line("http://www.scholarslab.org index.html").unwrap();
        assert_eq!(short.size, FetchSize::Unknown);
        assert_eq!(short.path, "data/index.html");
    }

    #[test]
    fn path_may_contain_spaces() {
        let e = FetchList::parse_line("http://x/a - data/my file.txt").unwrap();
        assert_eq!(e.path, "data/my file.txt");
    }

    #[test]
    fn single_field_lines_are_skipped() {
        assert!(FetchList::parse_line("http://lonely").is_none());
        assert!(FetchList::parse_line("http://x -").is_none());
        assert!(FetchList::parse_line("http://x  -  ").is_none());
        let list = FetchList::parse("http://lonely\n\nhttp://x - a\n");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn serialize_has_no_trailing_newline() {
        let list = FetchList::parse("http://a - data/a\nhttp://b 7 data/b\n");
        assert_eq!(list.serialize(), "http://a - data/a\nhttp://b 7 data/b");
        assert_eq!(FetchList::new().serialize(), "");
    }

    #[test]
    fn merge_appends_and_replace_resets() {
        let mut list = FetchList::parse("http://a - data/a\n");
        list.add_entries([FetchEntry::new("http://b", FetchSize::Unknown, "b")], true);
        assert_eq!(list.len(), 2);
        list.add_entries([FetchEntry::new("http://c", FetchSize::Known(1), "c")], false);
        assert_eq!(list.len(), 1);
        assert_eq!(list.entries()[0].path, "data/c");
    }

    #[test]
    fn load_missing_is_empty_and_write_persists() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FetchList::load(dir.path(), &TagEncoding::Utf8).unwrap().is_empty());

        let list = FetchList::parse("http://a - data/a\n");
        list.write(dir.path(), &TagEncoding::Utf8).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join(FETCH_FILE)).unwrap(),
            "http://a - data/a"
        );
        assert_eq!(FetchList::load(dir.path(), &TagEncoding::Utf8).unwrap(), list);
    }

    proptest! {
        #[test]
        fn parse_line_never_panics(line in "\\PC{0,64}") {
            let _ = FetchList::parse_line(&line);
        }

        #[test]
        fn written_lines_parse_back(size in proptest::option::of(0u64..1_000_000), name in "[a-z]{1,12}") {
            let size = size.map(FetchSize::Known).unwrap_or(FetchSize::Unknown);
            let entry = FetchEntry::new(format!("http://host/{name}"), size, &name);
            prop_assert_eq!(FetchList::parse_line(&entry.to_string()), Some(entry));
        }
    }
}
