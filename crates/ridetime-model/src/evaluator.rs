//! Held-out evaluation of a trained model.

use crate::error::ModelError;
use crate::metrics::rmse;
use crate::regression::LinearRegression;
use polars::prelude::DataFrame;
use ridetime_features::{DictVectorizer, duration_target, to_dicts};
use tracing::info;

/// Score a prepared validation table, returning its RMSE.
///
/// Rows are encoded with the already fitted vectorizer. Categories that were
/// not seen in training map to no feature and contribute nothing.
pub fn run_model(
    df: &DataFrame,
    categorical: &[String],
    vectorizer: &DictVectorizer,
    model: &LinearRegression,
) -> Result<f64, ModelError> {
    let val_dicts = to_dicts(df, categorical)?;
    let x_val = vectorizer.transform(&val_dicts);
    let y_pred = model.predict(&x_val)?;
    let y_val = duration_target(df)?;

    let rmse = rmse(&y_val, &y_pred)?;
    info!("The RMSE of validation is: {}", rmse);
    Ok(rmse)
}
