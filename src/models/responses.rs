use serde::{Deserialize, Serialize};
use crate::models::domain::{Match, RunStats};

/// Response for the run endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMatchingResponse {
    pub matches: Vec<Match>,
    pub proposers: Vec<usize>,
    pub receivers: Vec<usize>,
    pub unmatched: Vec<usize>,
    pub stats: RunStats,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
