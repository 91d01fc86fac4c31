use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::models::{ApplicantRecord, FeatureRow, APPLICANT_FIELDS};

/// Problems with a configured feature contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("feature contract has no columns")]
    Empty,

    #[error("feature contract references unknown applicant field '{0}'")]
    UnknownField(String),

    #[error("feature contract maps more than one field to column '{0}'")]
    DuplicateColumn(String),
}

/// Failure while building a feature row for one request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("applicant record has no field '{0}'")]
    MissingField(String),
}

/// One request field and the column name the model was fit with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub field: String,
    pub column: String,
}

impl ColumnMapping {
    pub fn new(field: &str, column: &str) -> Self {
        Self {
            field: field.to_string(),
            column: column.to_string(),
        }
    }
}

/// Default mapping: the model was fit on hyphenated column names
pub fn default_columns() -> Vec<ColumnMapping> {
    vec![
        ColumnMapping::new("age", "age"),
        ColumnMapping::new("education_num", "education-num"),
        ColumnMapping::new("sex", "sex"),
        ColumnMapping::new("hours_per_week", "hours-per-week"),
    ]
}

/// Ordered mapping from request schema to model feature columns
///
/// The request field names are external API surface only; the column names
/// and their order must match what the model saw at fit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureContract {
    columns: Vec<ColumnMapping>,
}

impl FeatureContract {
    pub fn new(columns: Vec<ColumnMapping>) -> Result<Self, ContractError> {
        if columns.is_empty() {
            return Err(ContractError::Empty);
        }

        let mut seen = HashSet::new();
        for mapping in &columns {
            if !APPLICANT_FIELDS.contains(&mapping.field.as_str()) {
                return Err(ContractError::UnknownField(mapping.field.clone()));
            }
            if !seen.insert(mapping.column.as_str()) {
                return Err(ContractError::DuplicateColumn(mapping.column.clone()));
            }
        }

        Ok(Self { columns })
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|m| m.column.as_str()).collect()
    }

    pub fn mappings(&self) -> &[ColumnMapping] {
        &self.columns
    }

    /// Check the contract against the feature names a model was fit with
    pub fn matches(&self, fit_columns: &[String]) -> bool {
        self.columns.len() == fit_columns.len()
            && self
                .columns
                .iter()
                .zip(fit_columns)
                .all(|(m, c)| &m.column == c)
    }

    /// Encode a validated applicant into the model's feature row
    pub fn encode(&self, record: &ApplicantRecord) -> Result<FeatureRow, EncodingError> {
        let mut columns = Vec::with_capacity(self.columns.len());
        let mut values = Vec::with_capacity(self.columns.len());

        for mapping in &self.columns {
            let value = record
                .field(&mapping.field)
                .ok_or_else(|| EncodingError::MissingField(mapping.field.clone()))?;
            columns.push(mapping.column.clone());
            values.push(value as f64);
        }

        Ok(FeatureRow { columns, values })
    }
}

impl Default for FeatureContract {
    fn default() -> Self {
        Self {
            columns: default_columns(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sex: i64) -> ApplicantRecord {
        ApplicantRecord { age: 35, education_num: 13, sex, hours_per_week: 40 }
    }

    #[test]
    fn test_default_contract_uses_hyphenated_columns() {
        let contract = FeatureContract::default();
        assert_eq!(
            contract.column_names(),
            vec!["age", "education-num", "sex", "hours-per-week"]
        );
    }

    #[test]
    fn test_encode_preserves_contract_order() {
        let row = FeatureContract::default().encode(&record(0)).unwrap();
        assert_eq!(row.columns, vec!["age", "education-num", "sex", "hours-per-week"]);
        assert_eq!(row.values, vec![35.0, 13.0, 0.0, 40.0]);
        assert_eq!(row.get("education-num"), Some(13.0));
        assert_eq!(row.get("education_num"), None);
    }

    #[test]
    fn test_custom_contract_reorders() {
        let contract = FeatureContract::new(vec![
            ColumnMapping::new("hours_per_week", "hours_per_week"),
            ColumnMapping::new("age", "age"),
        ])
        .unwrap();

        let row = contract.encode(&record(1)).unwrap();
        assert_eq!(row.values, vec![40.0, 35.0]);
    }

    #[test]
    fn test_contract_rejects_unknown_field() {
        let err = FeatureContract::new(vec![ColumnMapping::new("income", "income")]).unwrap_err();
        assert_eq!(err, ContractError::UnknownField("income".to_string()));
    }

    #[test]
    fn test_contract_rejects_duplicates_and_empty() {
        let err = FeatureContract::new(vec![
            ColumnMapping::new("age", "x"),
            ColumnMapping::new("sex", "x"),
        ])
        .unwrap_err();
        assert_eq!(err, ContractError::DuplicateColumn("x".to_string()));
        assert_eq!(FeatureContract::new(vec![]).unwrap_err(), ContractError::Empty);
    }

    #[test]
    fn test_matches_fit_columns() {
        let contract = FeatureContract::default();
        let fit: Vec<String> = ["age", "education-num", "sex", "hours-per-week"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(contract.matches(&fit));

        let underscored: Vec<String> = ["age", "education_num", "sex", "hours_per_week"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(!contract.matches(&underscored));
    }
}
