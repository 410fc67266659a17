use serde::{Deserialize, Serialize};

use crate::core::{FlatScore, MatchResult};
use crate::models::domain::Track;

/// Response for the diagnose endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnoseResponse {
    pub id: String,
    pub result: MatchResult,
    pub duration_ms: u64,
}

/// A persisted diagnosis: flattened scores plus the ids they refer to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDiagnosis {
    pub id: String,
    pub user_type: Track,
    pub profile: serde_json::Value,
    pub matched_support_ids: Vec<String>,
    pub scores: Vec<FlatScore>,
    pub matched_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
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
