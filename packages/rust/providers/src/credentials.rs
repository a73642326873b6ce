//! Credential lookup for the external services.
//!
//! Keys are resolved at call time, never cached, so a key exported while the
//! process runs is picked up by the next query.

use std::collections::HashMap;

use cityscout_shared::AppConfig;

/// The external services that take an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    TextGeneration,
    Weather,
    PhotoSearch,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextGeneration => "text_generation",
            Self::Weather => "weather",
            Self::PhotoSearch => "photo_search",
        }
    }
}

/// Source of API keys.
pub trait CredentialProvider: Send + Sync {
    /// The key for `service`, or `None` when it is not configured.
    fn get(&self, service: Service) -> Option<String>;

    /// Name shown in failure reports when the key is missing.
    fn describe(&self, service: Service) -> String {
        service.as_str().to_string()
    }
}

/// Reads keys from the process environment using the env var names in the config.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    text_generation: String,
    weather: String,
    photo_search: String,
}

impl EnvCredentials {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            text_generation: config.text_generation.api_key_env.clone(),
            weather: config.weather.api_key_env.clone(),
            photo_search: config.photos.api_key_env.clone(),
        }
    }

    fn var_name(&self, service: Service) -> &str {
        match service {
            Service::TextGeneration => &self.text_generation,
            Service::Weather => &self.weather,
            Service::PhotoSearch => &self.photo_search,
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn get(&self, service: Service) -> Option<String> {
        std::env::var(self.var_name(service))
            .ok()
            .filter(|value| is_usable_key(value))
    }

    fn describe(&self, service: Service) -> String {
        self.var_name(service).to_string()
    }
}

/// Fixed keys, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    keys: HashMap<Service, String>,
}

impl StaticCredentials {
    /// No keys at all: every adapter takes its fallback path.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, service: Service, key: impl Into<String>) -> Self {
        self.keys.insert(service, key.into());
        self
    }
}

impl CredentialProvider for StaticCredentials {
    fn get(&self, service: Service) -> Option<String> {
        self.keys
            .get(&service)
            .filter(|value| is_usable_key(value))
            .cloned()
    }
}

/// Empty values and template placeholders such as `your-pexels-api-key-here`
/// count as absent.
fn is_usable_key(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !(value.starts_with("your-") && value.ends_with("-here"))
}
