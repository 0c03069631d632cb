#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ridetime/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod artifacts;
pub mod report;

pub use artifacts::{ArtifactError, ArtifactPaths, load_artifacts, save_artifacts};
pub use report::{ExportFormat, ReportError, RunSummary};
