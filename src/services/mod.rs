// Service exports
pub mod gateway;
pub mod logistic;

pub use gateway::{FixedLabelGateway, GatewayError, ModelGateway};
pub use logistic::{LogisticModel, ModelLoadError};
