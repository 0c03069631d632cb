//! Deployment declaration for an external scheduler.
//!
//! Nothing here schedules anything. The declaration records how the scheduler
//! is expected to invoke `ridetime run`: monthly, on the 15th at 09:00, in a
//! subprocess, with the reference date as the only parameter.

use crate::pipeline::DEFAULT_DATE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cron expression for 09:00 on the 15th of every month.
pub const MONTHLY_CRON: &str = "0 9 15 * *";

/// How the scheduler runs the pipeline process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Runner {
    /// Separate process per run
    Subprocess,
}

/// Static scheduling metadata for the training pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Deployment name
    pub name: String,
    /// Entry point invoked by the scheduler
    pub flow: String,
    /// Cron schedule
    pub schedule: String,
    /// Process model
    pub runner: Runner,
    /// Free-form labels
    pub tags: Vec<String>,
    /// Default parameters passed to the entry point
    pub parameters: BTreeMap<String, String>,
}

impl Default for Deployment {
    fn default() -> Self {
        Self::model_training()
    }
}

impl Deployment {
    /// The monthly model training deployment.
    pub fn model_training() -> Self {
        Self {
            name: "model_training".to_string(),
            flow: "ridetime run".to_string(),
            schedule: MONTHLY_CRON.to_string(),
            runner: Runner::Subprocess,
            tags: vec!["ml".to_string()],
            parameters: BTreeMap::from([("date".to_string(), DEFAULT_DATE.to_string())]),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_training_deployment() {
        let deployment = Deployment::default();
        assert_eq!(deployment.schedule, "0 9 15 * *");
        assert_eq!(deployment.tags, vec!["ml"]);
        assert_eq!(deployment.parameters.get("date").map(String::as_str), Some("2022-03-15"));
    }

    #[test]
    fn test_json_shape() {
        let json = Deployment::model_training().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["runner"], "subprocess");
        assert_eq!(value["name"], "model_training");
    }
}
