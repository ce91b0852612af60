use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to run a matching over an inline population
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunMatchingRequest {
    #[validate(length(min = 1))]
    pub scores: Vec<Vec<f64>>,
    #[validate(length(min = 1))]
    #[serde(alias = "genders")]
    pub identities: Vec<String>,
    #[validate(length(min = 1))]
    #[serde(alias = "genderPreferences", alias = "gender_preferences")]
    pub preferences: Vec<String>,
    /// Fixes the proposer/receiver split when present
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Request to run a matching over the configured dataset files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunDatasetRequest {
    #[serde(default)]
    pub seed: Option<u64>,
}
