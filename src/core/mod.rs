pub mod attributes;
pub mod cache;
pub mod composer;
pub mod fetcher;
pub mod geo;
pub mod historical;
pub mod scoring;

pub use crate::domain::model::{HazardResult, RiskAssessment, RiskLevel};
pub use crate::domain::ports::{ConfigProvider, Transport};
pub use crate::utils::error::Result;
