//! Calendar periods and source locations.
//!
//! A run is driven by a reference date. The month before the reference month
//! is the validation period and the month before that is the training period.

use crate::error::{DataError, Result};
use chrono::{Datelike, NaiveDate};
use derive_more::Display;

/// Public NYC TLC trip record bucket.
pub const DEFAULT_BASE: &str = "https://nyc-tlc.s3.amazonaws.com/trip+data";

/// File prefix of the for-hire-vehicle trip records.
pub const DEFAULT_PREFIX: &str = "fhv_tripdata";

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{year:04}-{month:02}")]
pub struct Period {
    /// Calendar year
    pub year: i32,
    /// Month, 1 through 12
    pub month: u32,
}

impl Period {
    /// Create a period, rejecting months outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(DataError::PeriodOutOfRange(format!(
                "month {} is not in 1..=12",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// Period containing a reference date given as `YYYY-MM-DD`.
    pub fn parse_reference_date(date: &str) -> Result<Self> {
        let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|e| {
            DataError::InvalidDate {
                input: date.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            year: parsed.year(),
            month: parsed.month(),
        })
    }

    /// The period `months` calendar months before this one.
    pub fn preceding(&self, months: u32) -> Result<Self> {
        let index = i64::from(self.year) * 12 + i64::from(self.month) - 1 - i64::from(months);
        let year = i32::try_from(index.div_euclid(12))
            .map_err(|_| DataError::PeriodOutOfRange(format!("{} minus {} months", self, months)))?;
        let month = index.rem_euclid(12) as u32 + 1;
        Ok(Self { year, month })
    }
}

/// Training and validation periods for a reference date.
///
/// Returns `(train, validation)`: two months and one month before the
/// reference month respectively.
pub fn resolve_periods(date: &str) -> Result<(Period, Period)> {
    let reference = Period::parse_reference_date(date)?;
    Ok((reference.preceding(2)?, reference.preceding(1)?))
}

/// Where monthly trip files live and how they are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    /// URL or directory holding the monthly files
    pub base: String,
    /// File name prefix, followed by `_YYYY-MM.parquet`
    pub prefix: String,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl SourceLayout {
    /// Layout with a custom base and the default prefix.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            ..Self::default()
        }
    }

    /// File name for a period.
    pub fn file_name(&self, period: Period) -> String {
        format!("{}_{}.parquet", self.prefix, period)
    }

    /// Source identifier for a period.
    pub fn locate(&self, period: Period) -> String {
        format!("{}/{}", self.base.trim_end_matches('/'), self.file_name(period))
    }
}

/// Resolved source identifiers for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    /// Training period
    pub train_period: Period,
    /// Validation period
    pub validation_period: Period,
    /// Training source identifier
    pub train: String,
    /// Validation source identifier
    pub validation: String,
}

/// Resolve both source identifiers for a reference date.
pub fn get_paths(date: &str, layout: &SourceLayout) -> Result<SourcePaths> {
    let (train_period, validation_period) = resolve_periods(date)?;
    Ok(SourcePaths {
        train_period,
        validation_period,
        train: layout.locate(train_period),
        validation: layout.locate(validation_period),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2022-03-15", "2022-01", "2022-02")]
    #[case("2022-01-10", "2021-11", "2021-12")]
    #[case("2022-02-28", "2021-12", "2022-01")]
    #[case("2023-12-01", "2023-10", "2023-11")]
    fn test_resolve_periods(#[case] date: &str, #[case] train: &str, #[case] validation: &str) {
        let (t, v) = resolve_periods(date).unwrap();
        assert_eq!(t.to_string(), train);
        assert_eq!(v.to_string(), validation);
    }

    #[rstest]
    #[case("2022-13-01")]
    #[case("2022/03/15")]
    #[case("")]
    #[case("march")]
    fn test_malformed_date(#[case] date: &str) {
        let result = resolve_periods(date);
        assert!(matches!(result, Err(DataError::InvalidDate { .. })));
    }

    #[test]
    fn test_preceding_many_years() {
        let p = Period::new(2022, 3).unwrap();
        assert_eq!(p.preceding(27).unwrap(), Period::new(2019, 12).unwrap());
        assert_eq!(p.preceding(0).unwrap(), p);
    }

    #[test]
    fn test_period_rejects_bad_month() {
        assert!(Period::new(2022, 0).is_err());
        assert!(Period::new(2022, 13).is_err());
    }

    #[test]
    fn test_default_layout_paths() {
        let paths = get_paths("2022-03-15", &SourceLayout::default()).unwrap();
        assert_eq!(
            paths.train,
            "https://nyc-tlc.s3.amazonaws.com/trip+data/fhv_tripdata_2022-01.parquet"
        );
        assert_eq!(
            paths.validation,
            "https://nyc-tlc.s3.amazonaws.com/trip+data/fhv_tripdata_2022-02.parquet"
        );
    }

    #[test]
    fn test_local_layout_trailing_slash() {
        let layout = SourceLayout::with_base("/data/trips/");
        let p = Period::new(2021, 11).unwrap();
        assert_eq!(layout.locate(p), "/data/trips/fhv_tripdata_2021-11.parquet");
    }
}
