use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use validator::Validate;

use crate::models::domain::{ApplicantRecord, APPLICANT_FIELDS};

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Request body failed schema or range checks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid applicant record: {}", summarize(.0))]
pub struct ValidationError(pub Vec<FieldError>);

impl ValidationError {
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse an untyped predict body into a validated applicant
///
/// Every offending field is reported, not just the first one.
pub fn parse_applicant(body: &Value) -> Result<ApplicantRecord, ValidationError> {
    let object = match body {
        Value::Object(map) => map,
        _ => {
            return Err(ValidationError(vec![FieldError::new(
                "body",
                "expected a JSON object",
            )]))
        }
    };

    let mut errors = Vec::new();
    let mut values = [0i64; 4];

    for (slot, name) in values.iter_mut().zip(APPLICANT_FIELDS) {
        match required_int(object, name) {
            Ok(v) => *slot = v,
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(ValidationError(errors));
    }

    let [age, education_num, sex, hours_per_week] = values;
    let record = ApplicantRecord {
        age,
        education_num,
        sex,
        hours_per_week,
    };

    if let Err(range_errors) = record.validate() {
        // Keep schema order so responses are stable
        for name in APPLICANT_FIELDS {
            if let Some(field_errors) = range_errors.field_errors().get(name) {
                for e in field_errors.iter() {
                    let reason = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    errors.push(FieldError::new(name, reason));
                }
            }
        }
        return Err(ValidationError(errors));
    }

    Ok(record)
}

fn required_int(object: &Map<String, Value>, name: &str) -> Result<i64, FieldError> {
    let value = object
        .get(name)
        .ok_or_else(|| FieldError::new(name, "field required"))?;
    coerce_int(value).map_err(|reason| FieldError::new(name, reason))
}

/// Lax integer coercion: integers, whole floats and integer strings
fn coerce_int(value: &Value) -> Result<i64, &'static str> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if n.is_u64() {
                return Err("integer out of range");
            }
            let f = n.as_f64().ok_or("expected an integer")?;
            if f.fract() != 0.0 {
                return Err("expected an integer, got a number with a fractional part");
            }
            if f < i64::MIN as f64 || f >= i64::MAX as f64 {
                return Err("integer out of range");
            }
            Ok(f as i64)
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| "expected an integer, unable to parse string"),
        Value::Null => Err("expected an integer, got null"),
        Value::Bool(_) => Err("expected an integer, got a boolean"),
        Value::Array(_) | Value::Object(_) => Err("expected an integer"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_record() {
        let record = parse_applicant(&json!({
            "age": 35, "education_num": 13, "sex": 0, "hours_per_week": 40
        }))
        .unwrap();

        assert_eq!(record.age, 35);
        assert_eq!(record.education_num, 13);
        assert_eq!(record.sex, 0);
        assert_eq!(record.hours_per_week, 40);
    }

    #[test]
    fn test_missing_field_is_named() {
        let err = parse_applicant(&json!({ "age": 35, "education_num": 13, "sex": 0 })).unwrap_err();
        assert_eq!(err.fields(), vec!["hours_per_week"]);
        assert_eq!(err.0[0].reason, "field required");
    }

    #[test]
    fn test_all_offending_fields_reported() {
        let err = parse_applicant(&json!({ "age": "old", "sex": null })).unwrap_err();
        assert_eq!(err.fields(), vec!["age", "education_num", "sex", "hours_per_week"]);
    }

    #[test]
    fn test_lax_coercion() {
        let record = parse_applicant(&json!({
            "age": "35", "education_num": 13.0, "sex": " 1 ", "hours_per_week": 40
        }))
        .unwrap();
        assert_eq!(record.age, 35);
        assert_eq!(record.education_num, 13);
        assert_eq!(record.sex, 1);
    }

    #[test]
    fn test_rejects_fractional_and_boolean() {
        let err = parse_applicant(&json!({
            "age": 35.5, "education_num": 13, "sex": true, "hours_per_week": 40
        }))
        .unwrap_err();
        assert_eq!(err.fields(), vec!["age", "sex"]);
    }

    #[test]
    fn test_out_of_range_integers() {
        let err = parse_applicant(&json!({
            "age": 18446744073709551615u64,
            "education_num": 1e20,
            "sex": 0,
            "hours_per_week": "99999999999999999999"
        }))
        .unwrap_err();

        assert_eq!(err.fields(), vec!["age", "education_num", "hours_per_week"]);
        assert_eq!(err.0[0].reason, "integer out of range");
        assert_eq!(err.0[1].reason, "integer out of range");
        assert_eq!(err.0[2].reason, "expected an integer, unable to parse string");
    }

    #[test]
    fn test_range_checks() {
        let err = parse_applicant(&json!({
            "age": -1, "education_num": 13, "sex": 2, "hours_per_week": 40
        }))
        .unwrap_err();
        assert_eq!(err.fields(), vec!["age", "sex"]);
        assert_eq!(err.0[1].reason, "must be 0 or 1");
    }

    #[test]
    fn test_non_object_body() {
        let err = parse_applicant(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.fields(), vec!["body"]);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let record = parse_applicant(&json!({
            "age": 35, "education_num": 13, "sex": 1, "hours_per_week": 40, "name": "x"
        }));
        assert!(record.is_ok());
    }
}
