use std::sync::Arc;
use thiserror::Error;

use crate::config::{LoadFailurePolicy, ModelSettings};
use crate::core::audit::AuditPolicy;
use crate::core::encoding::{EncodingError, FeatureContract};
use crate::models::{ApplicantRecord, Assessment, Decision, Label};
use crate::services::{FixedLabelGateway, GatewayError, LogisticModel, ModelGateway, ModelLoadError};

/// Failures after a request has passed validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GuardrailError {
    #[error("model is not available: {0}")]
    GatewayUnavailable(String),

    #[error("feature encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("model invocation failed: {0}")]
    Gateway(#[from] GatewayError),
}

/// The model as seen by request handlers
#[derive(Clone)]
pub enum GatewayHandle {
    Loaded(Arc<dyn ModelGateway>),
    Unavailable { reason: String },
}

impl GatewayHandle {
    pub fn loaded<G: ModelGateway + 'static>(gateway: G) -> Self {
        GatewayHandle::Loaded(Arc::new(gateway))
    }

    /// Load the model once; on failure apply the configured startup policy
    pub async fn load(settings: &ModelSettings) -> Result<Self, ModelLoadError> {
        let error = match LogisticModel::load(&settings.path).await {
            Ok(model) => return Ok(GatewayHandle::loaded(model)),
            Err(e) => e,
        };

        tracing::error!("Error loading model from {}: {}", settings.path, error);
        match settings.on_load_failure {
            LoadFailurePolicy::Reject => {
                tracing::warn!("Serving without a model, predictions will be rejected");
                Ok(GatewayHandle::Unavailable { reason: error.to_string() })
            }
            LoadFailurePolicy::Mock => {
                tracing::warn!(
                    "Serving mocked predictions with label {}",
                    settings.mock_label.as_int()
                );
                Ok(GatewayHandle::loaded(FixedLabelGateway::new(settings.mock_label)))
            }
            LoadFailurePolicy::Abort => Err(error),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, GatewayHandle::Loaded(_))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            GatewayHandle::Loaded(gateway) => Some(gateway.name()),
            GatewayHandle::Unavailable { .. } => None,
        }
    }
}

impl std::fmt::Debug for GatewayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayHandle::Loaded(gateway) => f.debug_tuple("Loaded").field(&gateway.name()).finish(),
            GatewayHandle::Unavailable { reason } => {
                f.debug_struct("Unavailable").field("reason", reason).finish()
            }
        }
    }
}

/// Prediction service: encode, predict, then derive decision and audit note
///
/// # Pipeline Stages
/// 1. Feature encoding through the configured contract
/// 2. Model gateway invocation
/// 3. Decision from the label polarity
/// 4. Audit note from the first matching policy rule
#[derive(Debug, Clone)]
pub struct Guardrail {
    gateway: GatewayHandle,
    contract: FeatureContract,
    policy: AuditPolicy,
    approved_label: Label,
}

impl Guardrail {
    pub fn new(
        gateway: GatewayHandle,
        contract: FeatureContract,
        policy: AuditPolicy,
        approved_label: Label,
    ) -> Self {
        Self {
            gateway,
            contract,
            policy,
            approved_label,
        }
    }

    /// Default contract, default policy, label 1 means approved
    pub fn with_defaults(gateway: GatewayHandle) -> Self {
        Self::new(gateway, FeatureContract::default(), AuditPolicy::default(), Label::One)
    }

    pub fn gateway(&self) -> &GatewayHandle {
        &self.gateway
    }

    pub fn contract(&self) -> &FeatureContract {
        &self.contract
    }

    pub fn policy(&self) -> &AuditPolicy {
        &self.policy
    }

    /// Whether the loaded model was fit on the columns the contract produces
    ///
    /// Gateways that report no feature names are taken at their word.
    pub fn contract_matches_model(&self) -> bool {
        match &self.gateway {
            GatewayHandle::Loaded(gateway) => {
                gateway.feature_names().is_empty() || self.contract.matches(gateway.feature_names())
            }
            GatewayHandle::Unavailable { .. } => true,
        }
    }

    /// Run one validated applicant through the model and the audit table
    pub fn assess(&self, record: &ApplicantRecord) -> Result<Assessment, GuardrailError> {
        let gateway = match &self.gateway {
            GatewayHandle::Loaded(gateway) => gateway,
            GatewayHandle::Unavailable { reason } => {
                return Err(GuardrailError::GatewayUnavailable(reason.clone()))
            }
        };

        let row = self.contract.encode(record)?;
        let label = gateway.predict(&row)?;

        let decision = Decision::from_label(label, self.approved_label);
        let audit = self.policy.evaluate(label, decision, record);

        Ok(Assessment {
            decision,
            audit_note: audit.note.to_string(),
            audit_rule: audit.rule.map(str::to_string),
            raw_label: label,
        })
    }
}
