use crate::adapters::http::{DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT};
use crate::domain::ports::ConfigProvider;
use crate::domain::registry::{CacheTtls, Endpoints};
use crate::utils::error::{RiskError, Result};
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Service configuration. Every field is optional; anything left out falls back to
/// the production defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    pub endpoints: Endpoints,
    pub cache: CacheConfig,
    pub assessment: AssessmentConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub user_agent: Option<String>,
    pub request_timeout_seconds: Option<u64>,
    pub max_response_bytes: Option<usize>,
    pub assessment_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub elevation_ttl_seconds: Option<u64>,
    pub storm_surge_ttl_seconds: Option<u64>,
    pub hazard_maps_ttl_seconds: Option<u64>,
    pub weather_alerts_ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    pub include_historical: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| RiskError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Config whose upstreams all live on one host. Used against mock servers.
    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            endpoints: Endpoints::all_at(base_url),
            ..Self::default()
        }
    }

    /// 替換環境變數 (例如 ${API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RiskError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("endpoints.nve_base_url", &self.endpoints.nve_base_url)?;
        validate_url("endpoints.historical_events_url", &self.endpoints.historical_events_url)?;
        validate_url("endpoints.elevation_url", &self.endpoints.elevation_url)?;
        validate_url("endpoints.storm_surge_url", &self.endpoints.storm_surge_url)?;
        validate_url("endpoints.weather_alerts_url", &self.endpoints.weather_alerts_url)?;

        if let Some(secs) = self.service.request_timeout_seconds {
            validate_positive_number("service.request_timeout_seconds", secs as usize, 1)?;
        }
        if let Some(secs) = self.service.assessment_timeout_seconds {
            validate_positive_number("service.assessment_timeout_seconds", secs as usize, 1)?;
        }
        if let Some(bytes) = self.service.max_response_bytes {
            validate_positive_number("service.max_response_bytes", bytes, 1024)?;
        }
        if let Some(agent) = &self.service.user_agent {
            crate::utils::validation::validate_non_empty_string("service.user_agent", agent)?;
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

impl ConfigProvider for TomlConfig {
    fn endpoints(&self) -> Endpoints {
        self.endpoints.clone()
    }

    fn cache_ttls(&self) -> CacheTtls {
        let defaults = CacheTtls::default();
        let pick = |secs: Option<u64>, default: Duration| secs.map(Duration::from_secs).unwrap_or(default);
        CacheTtls {
            elevation: pick(self.cache.elevation_ttl_seconds, defaults.elevation),
            storm_surge: pick(self.cache.storm_surge_ttl_seconds, defaults.storm_surge),
            hazard_maps: pick(self.cache.hazard_maps_ttl_seconds, defaults.hazard_maps),
            weather_alerts: pick(self.cache.weather_alerts_ttl_seconds, defaults.weather_alerts),
        }
    }

    fn user_agent(&self) -> &str {
        self.service.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    fn request_timeout(&self) -> Duration {
        self.service
            .request_timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    fn max_response_bytes(&self) -> usize {
        self.service.max_response_bytes.unwrap_or(DEFAULT_MAX_RESPONSE_BYTES)
    }

    fn assessment_timeout(&self) -> Option<Duration> {
        self.service.assessment_timeout_seconds.map(Duration::from_secs)
    }

    fn include_historical(&self) -> bool {
        self.assessment.include_historical.unwrap_or(true)
    }
}
