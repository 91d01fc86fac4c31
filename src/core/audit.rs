use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ApplicantRecord, Decision, Label};

pub const GENDER_DISPARITY_NOTE: &str = "Bias Detected: Potential Gender Disparity Flagged.";
pub const AGE_DISCRIMINATION_NOTE: &str = "Bias Detected: Potential Age Discrimination Flagged.";
pub const AUDIT_PASSED_NOTE: &str = "Audit Passed: No bias detected.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("audit rule '{0}' has an empty note")]
    EmptyNote(String),

    #[error("audit rule '{rule}' constrains label to {value}, expected 0 or 1")]
    InvalidLabel { rule: String, value: u8 },

    #[error("audit rule '{rule}' constrains sex to {value}, expected 0 or 1")]
    InvalidSex { rule: String, value: i64 },

    #[error("default audit note is empty")]
    EmptyDefaultNote,
}

/// Built-in rule tables, one per policy version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyPreset {
    /// Flag denied female applicants only
    GenderOnly,
    /// Gender rule, then denied applicants under 25
    #[default]
    GenderAndAge,
}

impl PolicyPreset {
    pub fn name(&self) -> &'static str {
        match self {
            PolicyPreset::GenderOnly => "gender_only",
            PolicyPreset::GenderAndAge => "gender_and_age",
        }
    }
}

/// One row of the audit table. Unset conditions match anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRule {
    pub name: String,
    /// Raw gateway label, independent of which label means approval
    #[serde(default)]
    pub label: Option<u8>,
    #[serde(default)]
    pub decision: Option<Decision>,
    #[serde(default)]
    pub sex: Option<i64>,
    /// Exclusive upper bound on age
    #[serde(default)]
    pub age_below: Option<i64>,
    pub note: String,
}

impl AuditRule {
    fn applies(&self, label: Label, decision: Decision, record: &ApplicantRecord) -> bool {
        self.label.map_or(true, |l| l == label.as_int())
            && self.decision.map_or(true, |d| d == decision)
            && self.sex.map_or(true, |s| s == record.sex)
            && self.age_below.map_or(true, |limit| record.age < limit)
    }
}

fn gender_rule() -> AuditRule {
    AuditRule {
        name: "gender_disparity".to_string(),
        label: None,
        decision: Some(Decision::Denied),
        sex: Some(0),
        age_below: None,
        note: GENDER_DISPARITY_NOTE.to_string(),
    }
}

fn age_rule() -> AuditRule {
    AuditRule {
        name: "age_discrimination".to_string(),
        label: None,
        decision: Some(Decision::Denied),
        sex: None,
        age_below: Some(25),
        note: AGE_DISCRIMINATION_NOTE.to_string(),
    }
}

/// Outcome of evaluating the audit table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditOutcome<'a> {
    pub note: &'a str,
    pub rule: Option<&'a str>,
}

/// Ordered, first-match-wins audit table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditPolicy {
    version: String,
    rules: Vec<AuditRule>,
    default_note: String,
}

impl AuditPolicy {
    pub fn new(
        version: impl Into<String>,
        rules: Vec<AuditRule>,
        default_note: impl Into<String>,
    ) -> Result<Self, PolicyError> {
        let default_note = default_note.into();
        if default_note.trim().is_empty() {
            return Err(PolicyError::EmptyDefaultNote);
        }

        for rule in &rules {
            if rule.note.trim().is_empty() {
                return Err(PolicyError::EmptyNote(rule.name.clone()));
            }
            if let Some(value) = rule.label.filter(|l| *l > 1) {
                return Err(PolicyError::InvalidLabel { rule: rule.name.clone(), value });
            }
            if let Some(value) = rule.sex.filter(|s| !(0..=1).contains(s)) {
                return Err(PolicyError::InvalidSex { rule: rule.name.clone(), value });
            }
        }

        Ok(Self {
            version: version.into(),
            rules,
            default_note,
        })
    }

    pub fn preset(preset: PolicyPreset) -> Self {
        let rules = match preset {
            PolicyPreset::GenderOnly => vec![gender_rule()],
            PolicyPreset::GenderAndAge => vec![gender_rule(), age_rule()],
        };

        Self {
            version: preset.name().to_string(),
            rules,
            default_note: AUDIT_PASSED_NOTE.to_string(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn rules(&self) -> &[AuditRule] {
        &self.rules
    }

    /// Pick the audit note for a prediction
    pub fn evaluate(
        &self,
        label: Label,
        decision: Decision,
        record: &ApplicantRecord,
    ) -> AuditOutcome<'_> {
        self.rules
            .iter()
            .find(|rule| rule.applies(label, decision, record))
            .map(|rule| AuditOutcome {
                note: rule.note.as_str(),
                rule: Some(rule.name.as_str()),
            })
            .unwrap_or(AuditOutcome {
                note: self.default_note.as_str(),
                rule: None,
            })
    }
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self::preset(PolicyPreset::default())
    }
}
