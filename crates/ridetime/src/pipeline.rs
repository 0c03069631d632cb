//! Training pipeline for one reference date.
//!
//! Steps run strictly in order and each failure aborts the run:
//!
//! 1. resolve the training and validation sources
//! 2. load and prepare the training table
//! 3. load and prepare the validation table
//! 4. fit the vectorizer and regression on training data
//! 5. score the validation data
//! 6. write both artifacts
//!
//! Artifacts are only written once training and evaluation have succeeded.

use chrono::Utc;
use ridetime_data::{DataError, FetchConfig, SourceLayout, TripLoader, TripSource, get_paths};
use ridetime_features::columns::default_categorical;
use ridetime_features::{FeatureError, Prepared, Split, prepare_features};
use ridetime_model::{ModelError, TrainedModel, run_model, train_model};
use ridetime_output::{ArtifactError, ArtifactPaths, RunSummary, save_artifacts};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, instrument};

/// Reference date used when none is given.
pub const DEFAULT_DATE: &str = "2022-03-15";

/// Errors from any pipeline step.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Path resolution or loading failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// Feature preparation failed
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Training or evaluation failed
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Writing artifacts failed
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Configuration for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Reference date, `YYYY-MM-DD`
    pub date: String,
    /// Existing directory receiving the artifacts
    pub models_dir: PathBuf,
    /// Where monthly trip files are found
    pub layout: SourceLayout,
    /// Categorical feature columns
    pub categorical: Vec<String>,
    /// Download and cache behavior
    pub fetch: FetchConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            date: DEFAULT_DATE.to_string(),
            models_dir: PathBuf::from("models"),
            layout: SourceLayout::default(),
            categorical: default_categorical(),
            fetch: FetchConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Default configuration for a reference date.
    pub fn for_date(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Self::default()
        }
    }
}

/// Run the pipeline end to end.
#[instrument(name = "pipeline", skip_all, fields(date = %config.date))]
pub async fn run_pipeline(config: &PipelineConfig) -> Result<RunSummary, PipelineError> {
    let paths = get_paths(&config.date, &config.layout)?;
    info!(
        train = %paths.train,
        validation = %paths.validation,
        "resolved sources"
    );

    let loader = TripLoader::new(&config.fetch)?;

    let train = load_prepared(&loader, &paths.train, &config.categorical, Split::Training).await?;
    let validation = load_prepared(
        &loader,
        &paths.validation,
        &config.categorical,
        Split::Validation,
    )
    .await?;

    let trained = fit(&train, &config.categorical)?;
    let validation_rmse = evaluate(&validation, &config.categorical, &trained)?;

    let artifacts = ArtifactPaths::for_date(&config.models_dir, &config.date);
    save_artifacts(&artifacts, &trained.vectorizer, &trained.model)?;

    Ok(RunSummary {
        date: config.date.clone(),
        finished_at: Utc::now(),
        train_source: paths.train,
        validation_source: paths.validation,
        train_rows: train.frame.height(),
        validation_rows: validation.frame.height(),
        train_mean_duration: train.mean_duration,
        validation_mean_duration: validation.mean_duration,
        n_features: trained.vectorizer.n_features(),
        train_rmse: trained.rmse,
        validation_rmse,
        vectorizer_path: artifacts.vectorizer.display().to_string(),
        model_path: artifacts.model.display().to_string(),
    })
}

#[instrument(skip(loader, categorical))]
async fn load_prepared(
    loader: &TripLoader,
    source: &str,
    categorical: &[String],
    split: Split,
) -> Result<Prepared, PipelineError> {
    let df = loader.read_data(&TripSource::parse(source)).await?;
    Ok(prepare_features(df, categorical, split)?)
}

#[instrument(skip_all)]
fn fit(prepared: &Prepared, categorical: &[String]) -> Result<TrainedModel, PipelineError> {
    Ok(train_model(&prepared.frame, categorical)?)
}

#[instrument(skip_all)]
fn evaluate(
    prepared: &Prepared,
    categorical: &[String],
    trained: &TrainedModel,
) -> Result<f64, PipelineError> {
    Ok(run_model(
        &prepared.frame,
        categorical,
        &trained.vectorizer,
        &trained.model,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.date, "2022-03-15");
        assert_eq!(config.models_dir, PathBuf::from("models"));
        assert_eq!(config.categorical, vec!["PUlocationID", "DOlocationID"]);
    }

    #[tokio::test]
    async fn test_malformed_date_fails_before_loading() {
        let mut config = PipelineConfig::for_date("15/03/2022");
        config.fetch = FetchConfig::uncached();
        let result = run_pipeline(&config).await;
        assert!(matches!(
            result,
            Err(PipelineError::Data(DataError::InvalidDate { .. }))
        ));
    }
}
