use serde::{Deserialize, Serialize};
use validator::Validate;

/// Names of the applicant fields, in request schema order
pub const APPLICANT_FIELDS: [&str; 4] = ["age", "education_num", "sex", "hours_per_week"];

/// Validated applicant, alive for one request only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ApplicantRecord {
    #[validate(range(min = 0, message = "must be a non-negative integer"))]
    pub age: i64,
    #[validate(range(min = 0, message = "must be a non-negative integer"))]
    pub education_num: i64,
    /// 1 = Male, 0 = Female
    #[validate(range(min = 0, max = 1, message = "must be 0 or 1"))]
    pub sex: i64,
    #[validate(range(min = 0, message = "must be a non-negative integer"))]
    pub hours_per_week: i64,
}

impl ApplicantRecord {
    /// Look up a field by its request schema name
    pub fn field(&self, name: &str) -> Option<i64> {
        match name {
            "age" => Some(self.age),
            "education_num" => Some(self.education_num),
            "sex" => Some(self.sex),
            "hours_per_week" => Some(self.hours_per_week),
            _ => None,
        }
    }
}

/// Binary output of the model gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Zero,
    One,
}

impl Label {
    pub fn from_int(value: i64) -> Option<Self> {
        match value {
            0 => Some(Label::Zero),
            1 => Some(Label::One),
            _ => None,
        }
    }

    pub fn as_int(self) -> u8 {
        match self {
            Label::Zero => 0,
            Label::One => 1,
        }
    }
}

impl Serialize for Label {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_int())
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Label::from_int(value)
            .ok_or_else(|| serde::de::Error::custom(format!("label must be 0 or 1, got {}", value)))
    }
}

/// Human-facing outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Denied,
}

impl Decision {
    /// Map a gateway label to a decision given which label means approval
    pub fn from_label(label: Label, approved_label: Label) -> Self {
        if label == approved_label {
            Decision::Approved
        } else {
            Decision::Denied
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::Denied => "Denied",
        }
    }
}

/// Ordered, named numeric inputs handed to the gateway
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub columns: Vec<String>,
    pub values: Vec<f64>,
}

impl FeatureRow {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i).copied())
    }
}

/// Result of running one applicant through the guardrail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub decision: Decision,
    pub audit_note: String,
    /// Name of the audit rule that fired, None when the default note applied
    pub audit_rule: Option<String>,
    pub raw_label: Label,
}

impl Assessment {
    pub fn flagged(&self) -> bool {
        self.audit_rule.is_some()
    }
}
