//! Ethical Guardrail - prediction service with a rule-based bias audit
//!
//! Wraps a pre-trained binary classifier: validates an applicant, encodes it
//! into the model's feature contract, maps the label to a decision and
//! attaches an audit note from a configurable rule table.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{AuditPolicy, FeatureContract, GatewayHandle, Guardrail, GuardrailError};
pub use models::{ApplicantRecord, Assessment, Decision, Label, PredictionResponse};
pub use services::{FixedLabelGateway, LogisticModel, ModelGateway};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let guardrail = Guardrail::with_defaults(GatewayHandle::loaded(FixedLabelGateway::new(Label::One)));
        let record = ApplicantRecord { age: 40, education_num: 10, sex: 1, hours_per_week: 45 };
        assert_eq!(guardrail.assess(&record).unwrap().decision, Decision::Approved);
    }
}
