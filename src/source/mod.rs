//! Source Module
//!
//! Everything that talks to the outside: the documentation site and the
//! changelog service.

pub mod diff;
pub mod fetcher;
pub mod locator;

pub use diff::{Changelog, DiffServiceClient};
pub use fetcher::{Fetch, HttpFetcher};
pub use locator::{resolve, BundleLocator};
