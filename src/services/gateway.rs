use thiserror::Error;

use crate::models::{FeatureRow, Label};

/// Errors raised while invoking a model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("feature names unseen at fit time: expected {expected:?}, got {got:?}")]
    UnseenFeatures { expected: Vec<String>, got: Vec<String> },

    #[error("model expects {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("feature '{0}' is not a finite number")]
    NonFiniteFeature(String),
}

/// A pre-trained binary classifier
///
/// Implementations are built once at startup and shared read-only across
/// workers, so `predict` takes `&self`.
pub trait ModelGateway: Send + Sync {
    fn name(&self) -> &str;

    /// Column names the model was fit with, in order. Empty if the model
    /// does not check names.
    fn feature_names(&self) -> &[String];

    fn predict(&self, row: &FeatureRow) -> Result<Label, GatewayError>;
}

/// Gateway that answers every row with the same label
///
/// Used for the `mock` degraded mode when the real model fails to load.
#[derive(Debug, Clone)]
pub struct FixedLabelGateway {
    label: Label,
}

impl FixedLabelGateway {
    pub fn new(label: Label) -> Self {
        Self { label }
    }
}

impl ModelGateway for FixedLabelGateway {
    fn name(&self) -> &str {
        "fixed-label"
    }

    fn feature_names(&self) -> &[String] {
        &[]
    }

    fn predict(&self, _row: &FeatureRow) -> Result<Label, GatewayError> {
        Ok(self.label)
    }
}
