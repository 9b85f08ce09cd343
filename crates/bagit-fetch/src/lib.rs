//! Fetch-by-reference payload for BagIt bags.
//!
//! `fetch.txt` lists payload files that live at a URL instead of on disk.
//! [`FetchList`] parses and writes the file; [`resolve`] downloads the
//! entries through a [`Fetcher`] and collects per-entry failures without
//! aborting the rest.

pub mod entry;
pub mod error;
pub mod list;
pub mod resolve;
pub mod transport;

pub use entry::{FetchEntry, FetchSize};
pub use error::{FetchError, FetchResult};
pub use list::FetchList;
pub use resolve::{resolve, FetchFailure, FetchReport};
pub use transport::{Fetcher, HttpFetcher};
