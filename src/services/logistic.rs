use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{FeatureRow, Label};
use crate::services::gateway::{GatewayError, ModelGateway};

/// Errors that can occur while loading a model export
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model export: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model has {features} feature names but {coefficients} coefficients")]
    ShapeMismatch { features: usize, coefficients: usize },

    #[error("model threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),

    #[error("model has no features")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct LogisticExport {
    #[serde(default = "default_model_name")]
    name: String,
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

fn default_model_name() -> String { "logistic-regression".to_string() }
fn default_threshold() -> f64 { 0.5 }

/// Logistic regression loaded from a JSON export
///
/// ```json
/// {
///   "name": "fair_model",
///   "feature_names": ["age", "education-num", "sex", "hours-per-week"],
///   "coefficients": [0.045, 0.33, 1.3, 0.03],
///   "intercept": -8.3,
///   "threshold": 0.5
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LogisticModel {
    name: String,
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    threshold: f64,
}

impl LogisticModel {
    pub fn from_json_str(json: &str) -> Result<Self, ModelLoadError> {
        let export: LogisticExport = serde_json::from_str(json)?;

        if export.feature_names.is_empty() {
            return Err(ModelLoadError::Empty);
        }
        if export.feature_names.len() != export.coefficients.len() {
            return Err(ModelLoadError::ShapeMismatch {
                features: export.feature_names.len(),
                coefficients: export.coefficients.len(),
            });
        }
        if !(0.0..=1.0).contains(&export.threshold) {
            return Err(ModelLoadError::InvalidThreshold(export.threshold));
        }

        Ok(Self {
            name: export.name,
            feature_names: export.feature_names,
            coefficients: export.coefficients,
            intercept: export.intercept,
            threshold: export.threshold,
        })
    }

    /// Read and parse a model export from disk
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ModelLoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let model = Self::from_json_str(&json)?;
        tracing::info!(
            model = %model.name,
            path = %path.display(),
            features = model.feature_names.len(),
            "Model loaded"
        );
        Ok(model)
    }

    /// Probability of the positive class
    pub fn probability(&self, row: &FeatureRow) -> Result<f64, GatewayError> {
        self.check_columns(row)?;

        let mut z = self.intercept;
        for ((column, value), coef) in row.columns.iter().zip(&row.values).zip(&self.coefficients) {
            if !value.is_finite() {
                return Err(GatewayError::NonFiniteFeature(column.clone()));
            }
            z += coef * value;
        }

        Ok(1.0 / (1.0 + (-z).exp()))
    }

    fn check_columns(&self, row: &FeatureRow) -> Result<(), GatewayError> {
        if row.len() != self.feature_names.len() {
            return Err(GatewayError::FeatureCount {
                expected: self.feature_names.len(),
                got: row.len(),
            });
        }
        if row.columns != self.feature_names {
            return Err(GatewayError::UnseenFeatures {
                expected: self.feature_names.clone(),
                got: row.columns.clone(),
            });
        }
        Ok(())
    }
}

impl ModelGateway for LogisticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, row: &FeatureRow) -> Result<Label, GatewayError> {
        let p = self.probability(row)?;
        Ok(if p >= self.threshold { Label::One } else { Label::Zero })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{
        "name": "test_model",
        "feature_names": ["age", "education-num", "sex", "hours-per-week"],
        "coefficients": [0.045, 0.33, 1.3, 0.03],
        "intercept": -8.3
    }"#;

    fn row(columns: &[&str], values: &[f64]) -> FeatureRow {
        FeatureRow {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values: values.to_vec(),
        }
    }

    #[test]
    fn test_load_export() {
        let model = LogisticModel::from_json_str(EXPORT).unwrap();
        assert_eq!(model.name(), "test_model");
        assert_eq!(model.feature_names().len(), 4);
    }

    #[test]
    fn test_predict_twin_profiles() {
        let model = LogisticModel::from_json_str(EXPORT).unwrap();
        let cols = ["age", "education-num", "sex", "hours-per-week"];

        let female = model.predict(&row(&cols, &[35.0, 13.0, 0.0, 40.0])).unwrap();
        let male = model.predict(&row(&cols, &[35.0, 13.0, 1.0, 40.0])).unwrap();

        assert_eq!(female, Label::Zero);
        assert_eq!(male, Label::One);
    }

    #[test]
    fn test_underscored_columns_are_unseen() {
        let model = LogisticModel::from_json_str(EXPORT).unwrap();
        let err = model
            .predict(&row(&["age", "education_num", "sex", "hours_per_week"], &[35.0, 13.0, 0.0, 40.0]))
            .unwrap_err();

        assert!(matches!(err, GatewayError::UnseenFeatures { .. }));
        assert!(err.to_string().contains("unseen at fit time"));
    }

    #[test]
    fn test_wrong_width() {
        let model = LogisticModel::from_json_str(EXPORT).unwrap();
        let err = model.predict(&row(&["age"], &[35.0])).unwrap_err();
        assert_eq!(err, GatewayError::FeatureCount { expected: 4, got: 1 });
    }

    #[test]
    fn test_rejects_bad_exports() {
        let mismatch = r#"{"feature_names": ["a", "b"], "coefficients": [1.0], "intercept": 0.0}"#;
        assert!(matches!(
            LogisticModel::from_json_str(mismatch),
            Err(ModelLoadError::ShapeMismatch { features: 2, coefficients: 1 })
        ));

        let threshold = r#"{"feature_names": ["a"], "coefficients": [1.0], "intercept": 0.0, "threshold": 1.5}"#;
        assert!(matches!(
            LogisticModel::from_json_str(threshold),
            Err(ModelLoadError::InvalidThreshold(_))
        ));

        assert!(matches!(
            LogisticModel::from_json_str("not json"),
            Err(ModelLoadError::Parse(_))
        ));
    }

    #[test]
    fn test_deterministic() {
        let model = LogisticModel::from_json_str(EXPORT).unwrap();
        let cols = ["age", "education-num", "sex", "hours-per-week"];
        let r = row(&cols, &[20.0, 9.0, 1.0, 30.0]);
        let first = model.probability(&r).unwrap();
        let second = model.probability(&r).unwrap();
        assert_eq!(first, second);
        assert_eq!(model.predict(&r).unwrap(), Label::Zero);
    }
}
