// Core algorithm exports
pub mod audit;
pub mod encoding;
pub mod guardrail;

pub use audit::{AuditPolicy, AuditRule, AuditOutcome, PolicyError, PolicyPreset};
pub use encoding::{ColumnMapping, ContractError, EncodingError, FeatureContract};
pub use guardrail::{GatewayHandle, Guardrail, GuardrailError};
