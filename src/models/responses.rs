use crate::models::domain::ScoredShelter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response for the find-shelters endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindSheltersResponse {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    pub shelters: Vec<ScoredShelter>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(rename = "eligibleCandidates")]
    pub eligible_candidates: usize,
}

/// One cached shortlist entry served during navigation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionShelterResponse {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    pub index: usize,
    pub count: usize,
    pub shelter: ScoredShelter,
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
