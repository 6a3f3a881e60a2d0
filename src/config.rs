//! Runtime configuration.
//!
//! Defaults are usable as-is against a local proxy. A JSON file named by
//! `INPAINT_CONFIG` may override any field, and environment variables
//! override the file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{EditorError, Result};
use crate::service::{EditService, GeminiEditService, ProxyEditService};

pub const ENV_CONFIG_PATH: &str = "INPAINT_CONFIG";
pub const ENV_BACKEND: &str = "INPAINT_BACKEND";
pub const ENV_PROXY_URL: &str = "INPAINT_PROXY_URL";
pub const ENV_TIMEOUT_SECS: &str = "INPAINT_TIMEOUT_SECS";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";

/// Where edit requests are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// JSON proxy endpoint holding the model credentials
    #[default]
    Proxy,
    /// Direct calls to the Gemini API
    Gemini,
}

impl Backend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "proxy" => Some(Backend::Proxy),
            "gemini" => Some(Backend::Gemini),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: Backend,
    pub proxy_url: String,
    pub gemini_endpoint: String,
    pub gemini_model: String,
    /// Never written back out
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,
    /// Upper bound for one edit request, network and model time included
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub default_brush_radius: f32,
    pub max_brush_radius: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Proxy,
            proxy_url: "http://localhost:3000/api/edit-image".to_string(),
            gemini_endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            gemini_model: "gemini-3-pro-image-preview".to_string(),
            gemini_api_key: None,
            request_timeout_secs: 180,
            connect_timeout_secs: 10,
            default_brush_radius: 20.0,
            max_brush_radius: 200.0,
        }
    }
}

impl AppConfig {
    /// Defaults, then the optional config file, then the process environment
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(ENV_CONFIG_PATH) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        log::info!("Loading config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Applies overrides from `lookup` (the environment in production)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_BACKEND) {
            match Backend::parse(&value) {
                Some(backend) => self.backend = backend,
                None => log::warn!("Unknown {} value {:?}, keeping {:?}", ENV_BACKEND, value, self.backend),
            }
        }
        if let Some(url) = lookup(ENV_PROXY_URL) {
            self.proxy_url = url;
        }
        if let Some(key) = lookup(ENV_GEMINI_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.gemini_api_key = Some(key);
        }
        if let Some(model) = lookup(ENV_GEMINI_MODEL) {
            self.gemini_model = model;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            match value.trim().parse() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => log::warn!("Ignoring invalid {}={:?}", ENV_TIMEOUT_SECS, value),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(EditorError::Config("timeouts must be greater than zero".to_string()));
        }
        if !(self.default_brush_radius > 0.0 && self.default_brush_radius <= self.max_brush_radius) {
            return Err(EditorError::Config(format!(
                "default brush radius {} must be in (0, {}]",
                self.default_brush_radius, self.max_brush_radius
            )));
        }
        match self.backend {
            Backend::Proxy if self.proxy_url.trim().is_empty() => {
                Err(EditorError::Config("proxy backend needs a proxy_url".to_string()))
            }
            Backend::Gemini if self.gemini_api_key.is_none() => Err(EditorError::Config(format!(
                "gemini backend needs {}",
                ENV_GEMINI_API_KEY
            ))),
            _ => Ok(()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Builds the edit service selected by `backend`
    pub fn build_service(&self) -> Result<Arc<dyn EditService>> {
        let service: Arc<dyn EditService> = match self.backend {
            Backend::Proxy => Arc::new(ProxyEditService::new(self)?),
            Backend::Gemini => Arc::new(GeminiEditService::new(self)?),
        };
        log::info!("Using {} edit service", service.name());
        Ok(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_validate() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BACKEND, "Gemini"),
            (ENV_GEMINI_API_KEY, "secret"),
            (ENV_TIMEOUT_SECS, "30"),
            (ENV_GEMINI_MODEL, "some-model"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend, Backend::Gemini);
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.gemini_model, "some-model");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(|key| match key {
            ENV_BACKEND => Some("carrier-pigeon".to_string()),
            ENV_TIMEOUT_SECS => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_gemini_requires_key() {
        let config = AppConfig {
            backend: Backend::Gemini,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(EditorError::Config(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"backend":"gemini","request_timeout_secs":5}"#).unwrap();
        assert_eq!(config.backend, Backend::Gemini);
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.gemini_model, AppConfig::default().gemini_model);
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let config = AppConfig {
            gemini_api_key: Some("secret".to_string()),
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
