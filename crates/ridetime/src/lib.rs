#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ridetime/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod deployment;
pub mod pipeline;

// Re-export main types from sub-crates
pub use ridetime_data as data;
pub use ridetime_features as features;
pub use ridetime_model as model;
pub use ridetime_output as output;

pub use deployment::Deployment;
pub use pipeline::{DEFAULT_DATE, PipelineConfig, PipelineError, run_pipeline};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
