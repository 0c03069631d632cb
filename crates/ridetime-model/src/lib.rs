#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ridetime/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod evaluator;
pub mod linalg;
pub mod metrics;
pub mod regression;
pub mod trainer;

// Re-export main types
pub use error::ModelError;
pub use evaluator::run_model;
pub use metrics::{mse, rmse};
pub use regression::{LinearRegression, RegressionConfig};
pub use trainer::{TrainedModel, train_model};
