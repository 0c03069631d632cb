#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ridetime/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod error;
pub mod loader;
pub mod periods;

pub use cache::DownloadCache;
pub use error::{DataError, Result};
pub use loader::{FetchConfig, TripLoader, TripSource};
pub use periods::{Period, SourceLayout, SourcePaths, get_paths, resolve_periods};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
