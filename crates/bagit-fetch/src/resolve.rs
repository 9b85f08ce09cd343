use std::fs;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::entry::{FetchEntry, FetchSize};
use crate::error::{FetchError, FetchResult};
use crate::list::FetchList;
use crate::transport::Fetcher;

/// An entry that could not be retrieved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub url: String,
    pub path: String,
    pub reason: String,
}

/// Outcome of resolving a fetch list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchReport {
    /// Bag-relative paths written, in list order.
    pub fetched: Vec<String>,
    pub failures: Vec<FetchFailure>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Download every entry of `list` into the bag at `root`.
///
/// At most `concurrency` downloads run at once. A failed entry is recorded
/// in the report and does not stop the others.
pub fn resolve(root: &Path, list: &FetchList, fetcher: &dyn Fetcher, concurrency: usize) -> FetchReport {
    let mut report = FetchReport::default();
    let width = concurrency.max(1);

    for batch in list.entries().chunks(width) {
        let results: Vec<FetchResult<()>> = std::thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|entry| scope.spawn(move || fetch_one(root, entry, fetcher)))
                .collect();
            handles
                .into_iter()
                .map(|h| {
                    h.join().unwrap_or_else(|_| {
                        Err(FetchError::Transport {
                            url: String::new(),
                            message: "fetch worker panicked".into(),
                        })
                    })
                })
                .collect()
        });

        for (entry, result) in batch.iter().zip(results) {
            match result {
                Ok(()) => report.fetched.push(entry.path.clone()),
                Err(e) => {
                    tracing::warn!("failed to fetch {} -> {}: {}", entry.url, entry.path, e);
                    report.failures.push(FetchFailure {
                        url: entry.url.clone(),
                        path: entry.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    tracing::info!(
        "fetch resolved {} of {} entries",
        report.fetched.len(),
        list.len()
    );
    report
}

fn fetch_one(root: &Path, entry: &FetchEntry, fetcher: &dyn Fetcher) -> FetchResult<()> {
    if !is_contained(&entry.path) {
        return Err(FetchError::UnsafeTarget(entry.path.clone()));
    }
    let body = fetcher.fetch(&entry.url)?;
    if let FetchSize::Known(expected) = entry.size {
        let actual = body.len() as u64;
        if actual != expected {
            return Err(FetchError::SizeMismatch {
                url: entry.url.clone(),
                expected,
                actual,
            });
        }
    }

    let target = root.join(&entry.path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|source| FetchError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&target, body).map_err(|source| FetchError::Io {
        path: target.clone(),
        source,
    })
}

fn is_contained(rel: &str) -> bool {
    Path::new(rel)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapFetcher(HashMap<&'static str, &'static [u8]>);

    impl Fetcher for MapFetcher {
        fn fetch(&self, url: &str) -> FetchResult<Vec<u8>> {
            self.0
                .get(url)
                .map(|b| b.to_vec())
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn fetcher() -> MapFetcher {
        MapFetcher(HashMap::from([
            ("http://www.google.com", &b"<html>google</html>"[..]),
            ("http://www.yahoo.com", &b"<html>yahoo</html>"[..]),
        ]))
    }

    #[test]
    fn downloads_into_payload() {
        let dir = tempfile::tempdir().unwrap();
        let list = FetchList::parse(
            "http://www.google.com - data/google/index.html\n\
             http://www.yahoo.com - data/yahoo/index.html\n",
        );
        let report = resolve(dir.path(), &list, &fetcher(), 4);
        assert!(report.is_complete());
        assert_eq!(report.fetched, vec!["data/google/index.html", "data/yahoo/index.html"]);
        assert_eq!(
            fs::read(dir.path().join("data/google/index.html")).unwrap(),
            b"<html>google</html>"
        );
    }

    #[test]
    fn failures_do_not_stop_other_entries() {
        let dir = tempfile::tempdir().unwrap();
        let list = FetchList::parse(
            "http://nowhere.invalid - data/a.html\n\
             http://www.yahoo.com - data/b.html\n",
        );
        let report = resolve(dir.path(), &list, &fetcher(), 1);
        assert_eq!(report.fetched, vec!["data/b.html"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].url, "http://nowhere.invalid");
        assert!(report.failures[0].reason.contains("404"));
        assert!(!dir.path().join("data/a.html").exists());
    }

    #[test]
    fn size_mismatch_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let list = FetchList::parse("http://www.google.com 3 data/g.html\n");
        let report = resolve(dir.path(), &list, &fetcher(), 2);
        assert!(report.fetched.is_empty());
        assert!(report.failures[0].reason.contains("expected 3 bytes"));
    }

    #[test]
    fn escaping_targets_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let list = FetchList::parse("http://www.google.com - data/../../escape.html\n");
        let report = resolve(dir.path(), &list, &fetcher(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("escapes"));
    }

    #[test]
    fn zero_concurrency_still_runs() {
        let dir = tempfile::tempdir().unwrap();
        let list = FetchList::parse("http://www.google.com - g.html\n");
        let report = resolve(dir.path(), &list, &fetcher(), 0);
        assert_eq!(report.fetched, vec!["data/g.html"]);
    }
}
