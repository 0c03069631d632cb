//! Model training on the prepared training table.

use crate::error::ModelError;
use crate::metrics::rmse;
use crate::regression::LinearRegression;
use polars::prelude::DataFrame;
use ridetime_features::{DictVectorizer, duration_target, to_dicts};
use tracing::info;

/// Vectorizer and model fitted on one training table.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    /// Feature encoder fitted on the training rows
    pub vectorizer: DictVectorizer,
    /// Regression fitted on the encoded training rows
    pub model: LinearRegression,
    /// In-sample root mean squared error
    pub rmse: f64,
}

/// Fit the vectorizer and regression on a prepared training table.
///
/// Both are fit exactly once, on this table only.
pub fn train_model(df: &DataFrame, categorical: &[String]) -> Result<TrainedModel, ModelError> {
    let train_dicts = to_dicts(df, categorical)?;
    let y_train = duration_target(df)?;

    let (vectorizer, x_train) = DictVectorizer::fit_transform(&train_dicts)?;
    info!("The shape of X_train is {:?}", x_train.shape());
    info!("The DictVectorizer has {} features", vectorizer.n_features());

    let model = LinearRegression::fit(&x_train, &y_train)?;
    let y_pred = model.predict(&x_train)?;
    let rmse = rmse(&y_train, &y_pred)?;
    info!("The RMSE of training is: {}", rmse);

    Ok(TrainedModel {
        vectorizer,
        model,
        rmse,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use ridetime_features::columns::{DURATION, default_categorical};

    fn prepared(pu: &[&str], dolo: &[&str], duration: &[f64]) -> DataFrame {
        DataFrame::new(vec![
            Column::new("PUlocationID".into(), pu),
            Column::new("DOlocationID".into(), dolo),
            Column::new(DURATION.into(), duration),
        ])
        .unwrap()
    }

    #[test]
    fn test_train_model() {
        let df = prepared(&["1", "2", "1", "3"], &["5", "5", "6", "-1"], &[10.0, 20.0, 12.0, 40.0]);
        let trained = train_model(&df, &default_categorical()).unwrap();

        assert_eq!(trained.vectorizer.n_features(), 6);
        assert_eq!(trained.model.coefficients().len(), 6);
        assert!(trained.rmse.is_finite());
        assert!(trained.rmse >= 0.0);
    }

    #[test]
    fn test_train_twice_identical() {
        let df = prepared(&["1", "2", "2"], &["4", "4", "5"], &[7.0, 15.0, 21.0]);
        let a = train_model(&df, &default_categorical()).unwrap();
        let b = train_model(&df, &default_categorical()).unwrap();
        assert_eq!(a.model.coefficients(), b.model.coefficients());
        assert_eq!(a.model.intercept(), b.model.intercept());
        assert_eq!(a.vectorizer, b.vectorizer);
    }

    #[test]
    fn test_empty_training_table() {
        let df = prepared(&[], &[], &[]);
        assert!(train_model(&df, &default_categorical()).is_err());
    }
}
