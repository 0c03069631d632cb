#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ridetime/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod columns;
pub mod dict_vectorizer;
pub mod error;
pub mod prepare;
pub mod sparse;

pub use dict_vectorizer::{DictVectorizer, FeatureDict, FeatureValue};
pub use error::FeatureError;
pub use prepare::{Prepared, Split, duration_target, prepare_features, to_dicts};
pub use sparse::SparseMatrix;
