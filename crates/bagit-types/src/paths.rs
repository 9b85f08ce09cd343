//! Fixed names of the bag layout and the `data/` prefix convention.
//!
//! Manifest keys, fetch targets and file-add destinations are all
//! bag-root-relative strings with `/` separators. Payload paths always
//! start with `data/`.

use std::path::{Component, Path};

/// Payload directory name.
pub const DATA_DIR: &str = "data";
/// Bag declaration file.
pub const BAGIT_FILE: &str = "bagit.txt";
/// Optional metadata file.
pub const BAG_INFO_FILE: &str = "bag-info.txt";
/// Optional fetch-by-reference file.
pub const FETCH_FILE: &str = "fetch.txt";

const DATA_PREFIX: &str = "data/";

/// Normalise a caller-supplied destination into a payload path.
///
/// Backslashes become `/`, leading `./` and `/` are dropped, and `data/` is
/// prepended unless already present.
pub fn payload_path(dest: &str) -> String {
    let mut path = dest.replace('\\', "/");
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest.to_string();
        } else if let Some(rest) = path.strip_prefix('/') {
            path = rest.to_string();
        } else {
            break;
        }
    }
    if path.starts_with(DATA_PREFIX) {
        path
    } else {
        format!("{DATA_PREFIX}{path}")
    }
}

/// Returns `true` if the bag-relative path lies in the payload directory.
pub fn is_payload_path(path: &str) -> bool {
    path.starts_with(DATA_PREFIX)
}

/// Express `path` relative to `root` with `/` separators.
///
/// Returns `None` when `path` is not below `root` or a component is not
/// valid UTF-8.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    #[test]
    fn prefix_is_added() {
        assert_eq!(payload_path("README.txt"), "data/README.txt");
        assert_eq!(payload_path("pics/uvalib.png"), "data/pics/uvalib.png");
    }

    #[test]
    fn existing_prefix_is_kept() {
        assert_eq!(payload_path("data/README.txt"), "data/README.txt");
    }

    #[test]
    fn leading_separators_are_dropped() {
        assert_eq!(payload_path("/data/a.txt"), "data/a.txt");
        assert_eq!(payload_path("./a.txt"), "data/a.txt");
        assert_eq!(payload_path("pics\\a.png"), "data/pics/a.png");
    }

    #[test]
    fn payload_detection() {
        assert!(is_payload_path("data/x"));
        assert!(!is_payload_path("bagit.txt"));
        assert!(!is_payload_path("database.txt"));
    }

    #[test]
    fn relative_path_uses_forward_slashes() {
        let root = PathBuf::from("/bags/one");
        let file = root.join("data").join("imgs").join("a.png");
        assert_eq!(relative_path(&root, &file).as_deref(), Some("data/imgs/a.png"));
        assert_eq!(relative_path(&root, &root), None);
        assert_eq!(relative_path(&root, Path::new("/elsewhere/a")), None);
    }

    proptest! {
        #[test]
        fn payload_path_is_idempotent(s in "[a-zA-Z0-9_./]{0,24}") {
            let once = payload_path(&s);
            prop_assert!(once.starts_with("data/"));
            prop_assert_eq!(payload_path(&once), once.clone());
        }
    }
}
