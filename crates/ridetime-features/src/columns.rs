//! Trip table column names.

/// Pickup timestamp
pub const PICKUP_DATETIME: &str = "pickup_datetime";

/// Drop-off timestamp (capitalization follows the FHV files)
pub const DROPOFF_DATETIME: &str = "dropOff_datetime";

/// Pickup taxi zone
pub const PICKUP_LOCATION: &str = "PUlocationID";

/// Drop-off taxi zone
pub const DROPOFF_LOCATION: &str = "DOlocationID";

/// Derived trip duration in minutes
pub const DURATION: &str = "duration";

/// Categorical columns used as model features.
pub const DEFAULT_CATEGORICAL: [&str; 2] = [PICKUP_LOCATION, DROPOFF_LOCATION];

/// Categorical feature columns as owned names.
pub fn default_categorical() -> Vec<String> {
    DEFAULT_CATEGORICAL.iter().map(|c| (*c).to_string()).collect()
}
