// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{ApplicantRecord, Assessment, Decision, FeatureRow, Label, APPLICANT_FIELDS};
pub use requests::{parse_applicant, FieldError, ValidationError};
pub use responses::{ErrorResponse, HealthResponse, ModelInfo, PredictionResponse, ServiceInfoResponse};
