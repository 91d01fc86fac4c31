use serde::{Deserialize, Serialize};
use crate::models::domain::{Assessment, Decision, Label};
use crate::models::requests::FieldError;

/// Response for the predict endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictionResponse {
    pub decision: Decision,
    pub ethical_audit: String,
    pub raw_score: Label,
}

impl From<Assessment> for PredictionResponse {
    fn from(assessment: Assessment) -> Self {
        Self {
            decision: assessment.decision,
            ethical_audit: assessment.audit_note,
            raw_score: assessment.raw_label,
        }
    }
}

/// Service metadata returned from the root route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfoResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub model: ModelInfo,
    pub policy: String,
    /// Path of the endpoint reference
    pub documentation: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub loaded: bool,
    pub name: Option<String>,
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
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}
