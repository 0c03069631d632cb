//! Dictionary vectorizer.
//!
//! Learns a fixed feature space from per-row feature dictionaries. A
//! categorical value `v` under key `k` becomes the indicator feature `k=v`; a
//! numeric value under key `k` becomes feature `k` carrying the value itself.
//! Feature names are sorted, so the column order does not depend on row order.

use crate::error::FeatureError;
use crate::sparse::SparseMatrix;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Separator between key and value in indicator feature names.
pub const DEFAULT_SEPARATOR: &str = "=";

/// A single feature value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    /// Discrete label
    Categorical(String),
    /// Continuous value
    Numeric(f64),
}

/// Features of one row, keyed by column name.
pub type FeatureDict = BTreeMap<String, FeatureValue>;

/// Fitted dictionary vectorizer.
///
/// Only constructed by fitting; `transform` never changes the vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictVectorizer {
    separator: String,
    feature_names: Vec<String>,
    vocabulary: BTreeMap<String, usize>,
}

impl DictVectorizer {
    /// Learn the feature space of `dicts`.
    pub fn fit(dicts: &[FeatureDict]) -> Result<Self, FeatureError> {
        Self::fit_with_separator(dicts, DEFAULT_SEPARATOR)
    }

    /// Learn the feature space using a custom key/value separator.
    pub fn fit_with_separator(dicts: &[FeatureDict], separator: &str) -> Result<Self, FeatureError> {
        if dicts.is_empty() {
            return Err(FeatureError::EmptyFit);
        }

        let names: BTreeSet<String> = dicts
            .iter()
            .flat_map(|row| row.iter())
            .map(|(key, value)| feature_name(key, value, separator))
            .collect();

        let feature_names: Vec<String> = names.into_iter().collect();
        let vocabulary = feature_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        Ok(Self {
            separator: separator.to_string(),
            feature_names,
            vocabulary,
        })
    }

    /// Fit and encode the same rows.
    pub fn fit_transform(dicts: &[FeatureDict]) -> Result<(Self, SparseMatrix), FeatureError> {
        let fitted = Self::fit(dicts)?;
        let matrix = fitted.transform(dicts);
        Ok((fitted, matrix))
    }

    /// Encode rows into the fitted feature space.
    ///
    /// Features not seen during fitting are ignored, so an unseen category
    /// yields an all-zero block for its key.
    pub fn transform(&self, dicts: &[FeatureDict]) -> SparseMatrix {
        let rows = dicts
            .iter()
            .map(|row| {
                row.iter()
                    .filter_map(|(key, value)| {
                        let index = self.vocabulary.get(&feature_name(key, value, &self.separator))?;
                        let x = match value {
                            FeatureValue::Categorical(_) => 1.0,
                            FeatureValue::Numeric(v) => *v,
                        };
                        Some((*index, x))
                    })
                    .collect()
            })
            .collect();

        SparseMatrix::from_rows(self.n_features(), rows)
    }

    /// Feature names in column order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Column index of a feature name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.vocabulary.get(name).copied()
    }

    /// Width of the feature space.
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}

fn feature_name(key: &str, value: &FeatureValue, separator: &str) -> String {
    match value {
        FeatureValue::Categorical(label) => format!("{key}{separator}{label}"),
        FeatureValue::Numeric(_) => key.to_string(),
    }
}
