//! Trip feature preparation.
//!
//! Derives the trip duration target, drops implausible trips, and renders the
//! location columns as string categories:
//!
//! 1. `duration = (dropOff_datetime - pickup_datetime)` in minutes
//! 2. keep `1 <= duration <= 60`
//! 3. log the mean retained duration
//! 4. fill missing locations with `-1` and cast them to strings

use crate::columns::{DROPOFF_DATETIME, DURATION, PICKUP_DATETIME};
use crate::dict_vectorizer::{FeatureDict, FeatureValue};
use crate::error::FeatureError;
use derive_more::Display;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Shortest trip kept, in minutes.
pub const MIN_DURATION_MINUTES: f64 = 1.0;

/// Longest trip kept, in minutes.
pub const MAX_DURATION_MINUTES: f64 = 60.0;

/// Value substituted for missing categorical entries.
pub const MISSING_SENTINEL: i64 = -1;

const MICROS_PER_MINUTE: f64 = 60_000_000.0;

/// Which side of the split a table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Split {
    /// Fitting data
    #[display("training")]
    Training,
    /// Held-out data
    #[display("validation")]
    Validation,
}

/// A prepared trip table.
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Rows within the duration bounds, with normalized categorical columns
    pub frame: DataFrame,
    /// Mean duration of retained rows; `None` when nothing was retained
    pub mean_duration: Option<f64>,
    /// Number of input rows dropped by the duration filter
    pub dropped_rows: usize,
}

/// Timestamp column as microseconds since the epoch.
///
/// Normalizing the time unit first lets millisecond and nanosecond sources
/// share one subtraction.
fn epoch_micros(name: &str) -> Expr {
    col(name)
        .cast(DataType::Datetime(TimeUnit::Microseconds, None))
        .cast(DataType::Int64)
}

fn require_columns<'a>(
    df: &DataFrame,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), FeatureError> {
    for name in names {
        if df.get_column_index(name).is_none() {
            return Err(FeatureError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}

/// Prepare a raw trip table.
///
/// Rows with a null timestamp or a drop-off before pickup fall outside the
/// duration bounds and are dropped like any other out-of-range trip.
pub fn prepare_features(
    df: DataFrame,
    categorical: &[String],
    split: Split,
) -> Result<Prepared, FeatureError> {
    require_columns(&df, [PICKUP_DATETIME, DROPOFF_DATETIME])?;
    require_columns(&df, categorical.iter().map(String::as_str))?;

    let input_rows = df.height();

    let normalized: Vec<Expr> = categorical
        .iter()
        .map(|name| {
            col(name.as_str())
                .fill_null(lit(MISSING_SENTINEL))
                .cast(DataType::Int64)
                .fill_null(lit(MISSING_SENTINEL))
                .cast(DataType::String)
        })
        .collect();

    let frame = df
        .lazy()
        .with_column(
            ((epoch_micros(DROPOFF_DATETIME) - epoch_micros(PICKUP_DATETIME))
                .cast(DataType::Float64)
                / lit(MICROS_PER_MINUTE))
            .alias(DURATION),
        )
        .filter(
            col(DURATION)
                .gt_eq(lit(MIN_DURATION_MINUTES))
                .and(col(DURATION).lt_eq(lit(MAX_DURATION_MINUTES))),
        )
        .with_columns(normalized)
        .collect()?;

    let mean_duration = frame.column(DURATION)?.as_materialized_series().mean();
    let dropped_rows = input_rows - frame.height();

    match mean_duration {
        Some(mean) => info!("The mean duration of {} is {}", split, mean),
        None => info!("The mean duration of {} is undefined (no rows retained)", split),
    }
    debug!(%split, input_rows, dropped_rows, "prepared trip table");

    Ok(Prepared {
        frame,
        mean_duration,
        dropped_rows,
    })
}

/// Project a table to one feature dictionary per row.
///
/// String columns become categorical values, numeric columns numeric values.
/// Null entries are left out of the row's dictionary.
pub fn to_dicts(df: &DataFrame, columns: &[String]) -> Result<Vec<FeatureDict>, FeatureError> {
    require_columns(df, columns.iter().map(String::as_str))?;

    let mut rows: Vec<FeatureDict> = vec![BTreeMap::new(); df.height()];

    for name in columns {
        let series = df.column(name)?.as_materialized_series();
        match series.dtype() {
            DataType::String => {
                for (row, value) in rows.iter_mut().zip(series.str()?) {
                    if let Some(v) = value {
                        row.insert(name.clone(), FeatureValue::Categorical(v.to_string()));
                    }
                }
            }
            dtype if dtype.is_primitive_numeric() => {
                let values = series.cast(&DataType::Float64)?;
                for (row, value) in rows.iter_mut().zip(values.f64()?) {
                    if let Some(v) = value {
                        row.insert(name.clone(), FeatureValue::Numeric(v));
                    }
                }
            }
            dtype => {
                return Err(FeatureError::UnsupportedType {
                    column: name.clone(),
                    dtype: dtype.to_string(),
                });
            }
        }
    }

    Ok(rows)
}

/// The `duration` column as a dense target vector.
pub fn duration_target(df: &DataFrame) -> Result<Vec<f64>, FeatureError> {
    require_columns(df, [DURATION])?;
    let series = df.column(DURATION)?.as_materialized_series().cast(&DataType::Float64)?;
    series
        .f64()?
        .into_iter()
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| FeatureError::NullValues(DURATION.to_string()))
}
