use actix_web::{web, HttpResponse, Responder};
use serde_json::{json, Value};
use tracing::Instrument;

use crate::core::{Guardrail, GuardrailError};
use crate::models::{
    parse_applicant, ErrorResponse, HealthResponse, ModelInfo, PredictionResponse,
    ServiceInfoResponse, ValidationError, APPLICANT_FIELDS,
};

pub const SERVICE_NAME: &str = "Ethical AI Guardrail";
pub const DOCS_PATH: &str = "/docs";

/// Application state shared across all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub guardrail: Guardrail,
}

/// Configure prediction and metadata routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/", web::get().to(service_info))
        .route("/health", web::get().to(health_check))
        .route(DOCS_PATH, web::get().to(docs))
        .route("/predict", web::post().to(predict));
}

/// Static service metadata
async fn service_info(state: web::Data<AppState>) -> impl Responder {
    let gateway = state.guardrail.gateway();

    HttpResponse::Ok().json(ServiceInfoResponse {
        status: "Active".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: ModelInfo {
            loaded: gateway.is_loaded(),
            name: gateway.name().map(str::to_string),
        },
        policy: state.guardrail.policy().version().to_string(),
        documentation: DOCS_PATH.to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Endpoint reference, built from the running contract and audit policy
async fn docs(state: web::Data<AppState>) -> impl Responder {
    let guardrail = &state.guardrail;

    HttpResponse::Ok().json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            {"method": "GET", "path": "/", "description": "Service metadata"},
            {"method": "GET", "path": "/health", "description": "Liveness and model availability"},
            {"method": "GET", "path": DOCS_PATH, "description": "This reference"},
            {
                "method": "POST",
                "path": "/predict",
                "description": "Classify an applicant and audit the outcome",
                "request": {
                    "fields": APPLICANT_FIELDS,
                    "type": "integer",
                },
                "responses": {
                    "200": ["decision", "ethical_audit", "raw_score"],
                    "422": "validation_failed or invalid_json",
                    "500": "prediction_failed",
                    "503": "model_unavailable",
                },
            },
        ],
        "features": guardrail.contract().mappings(),
        "policy": {
            "version": guardrail.policy().version(),
            "rules": guardrail.policy().rules(),
        },
    }))
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.guardrail.gateway().is_loaded() { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Prediction and audit endpoint
///
/// POST /predict
///
/// Request body:
/// ```json
/// {
///   "age": 35,
///   "education_num": 13,
///   "sex": 0,
///   "hours_per_week": 40
/// }
/// ```
async fn predict(state: web::Data<AppState>, body: web::Json<Value>) -> impl Responder {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("predict", %request_id);

    async move {
        let record = match parse_applicant(&body) {
            Ok(record) => record,
            Err(e) => {
                tracing::info!("Validation failed: {}", e);
                return validation_failed(e);
            }
        };

        match state.guardrail.assess(&record) {
            Ok(assessment) => {
                tracing::info!(
                    decision = assessment.decision.as_str(),
                    raw_score = assessment.raw_label.as_int(),
                    flagged = assessment.flagged(),
                    rule = assessment.audit_rule.as_deref().unwrap_or("none"),
                    "Prediction served"
                );
                HttpResponse::Ok().json(PredictionResponse::from(assessment))
            }
            Err(e) => prediction_failed(e),
        }
    }
    .instrument(span)
    .await
}

fn validation_failed(error: ValidationError) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(ErrorResponse {
        error: "validation_failed".to_string(),
        message: error.to_string(),
        status_code: 422,
        details: error.0,
    })
}

fn prediction_failed(error: GuardrailError) -> HttpResponse {
    match error {
        GuardrailError::GatewayUnavailable(_) => {
            tracing::warn!("Prediction rejected: {}", error);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "model_unavailable".to_string(),
                message: error.to_string(),
                status_code: 503,
                details: vec![],
            })
        }
        GuardrailError::Encoding(_) | GuardrailError::Gateway(_) => {
            tracing::error!("Prediction failed: {}", error);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "prediction_failed".to_string(),
                message: error.to_string(),
                status_code: 500,
                details: vec![],
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::GatewayError;

    #[test]
    fn test_unavailable_maps_to_503() {
        let response = prediction_failed(GuardrailError::GatewayUnavailable("gone".to_string()));
        assert_eq!(response.status().as_u16(), 503);
    }

    #[test]
    fn test_gateway_error_maps_to_500() {
        let response = prediction_failed(GuardrailError::Gateway(GatewayError::FeatureCount {
            expected: 4,
            got: 2,
        }));
        assert_eq!(response.status().as_u16(), 500);
    }
}
