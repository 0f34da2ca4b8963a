pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::assessment::{AssessmentEngine, HazardFindings};
pub use config::TomlConfig;
pub use core::{cache::TtlCache, fetcher::RequestContext};
pub use domain::model::{Address, HazardResult, HistoricalEvent, RiskAssessment, RiskLevel, WeatherAlert};
pub use utils::error::{Result, RiskError};
