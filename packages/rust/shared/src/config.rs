//! Application configuration for CityScout.
//!
//! User config lives at `~/.cityscout/cityscout.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored here, only the names of the env vars holding them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CityScoutError, Result};
use crate::types::LookupEntry;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "cityscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".cityscout";

// ---------------------------------------------------------------------------
// Config structs (matching cityscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generative text service settings.
    #[serde(default)]
    pub text_generation: TextGenerationConfig,

    /// Geocoding search settings.
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Forecast service settings.
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Photo search settings.
    #[serde(default)]
    pub photos: PhotosConfig,

    /// Extra lookup-table entries merged over the built-in ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub knowledge: Vec<LookupEntry>,
}

/// `[text_generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextGenerationConfig {
    /// Name of the env var holding the API key.
    #[serde(default = "default_text_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_text_base_url")]
    pub base_url: String,

    /// Models tried in order for city summaries.
    #[serde(default = "default_text_models")]
    pub models: Vec<String>,

    /// Models tried in order for landmark search terms.
    #[serde(default = "default_landmark_models")]
    pub landmark_models: Vec<String>,

    #[serde(default = "default_text_timeout")]
    pub timeout_secs: u64,
}

impl Default for TextGenerationConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_text_key_env(),
            base_url: default_text_base_url(),
            models: default_text_models(),
            landmark_models: default_landmark_models(),
            timeout_secs: default_text_timeout(),
        }
    }
}

fn default_text_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_text_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_text_models() -> Vec<String> {
    [
        "gemini-3-flash-preview",
        "gemini-1.5-flash",
        "gemini-1.5-flash-8b",
        "gemini-1.5-pro",
    ]
    .map(String::from)
    .to_vec()
}
fn default_landmark_models() -> Vec<String> {
    default_text_models().into_iter().take(3).collect()
}
fn default_text_timeout() -> u64 {
    30
}

/// `[geocoding]` section. The geocoding service needs no credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,

    /// Number of candidates requested from the search.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: u32,

    #[serde(default = "default_short_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            max_candidates: default_max_candidates(),
            timeout_secs: default_short_timeout(),
        }
    }
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com".into()
}
fn default_max_candidates() -> u32 {
    10
}
fn default_short_timeout() -> u64 {
    10
}

/// `[weather]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_weather_key_env(),
            base_url: default_weather_base_url(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

fn default_weather_key_env() -> String {
    "TOMORROW_API_KEY".into()
}
fn default_weather_base_url() -> String {
    "https://api.tomorrow.io".into()
}
fn default_weather_timeout() -> u64 {
    30
}

/// `[photos]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotosConfig {
    #[serde(default = "default_photos_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_photos_base_url")]
    pub base_url: String,

    #[serde(default = "default_short_timeout")]
    pub timeout_secs: u64,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_photos_key_env(),
            base_url: default_photos_base_url(),
            timeout_secs: default_short_timeout(),
        }
    }
}

fn default_photos_key_env() -> String {
    "PEXELS_API_KEY".into()
}
fn default_photos_base_url() -> String {
    "https://api.pexels.com".into()
}

impl TextGenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl WeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PhotosConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Reject configs the adapters cannot work with.
    pub fn validate(&self) -> Result<()> {
        let endpoints = [
            ("text_generation", &self.text_generation.base_url, self.text_generation.timeout_secs),
            ("geocoding", &self.geocoding.base_url, self.geocoding.timeout_secs),
            ("weather", &self.weather.base_url, self.weather.timeout_secs),
            ("photos", &self.photos.base_url, self.photos.timeout_secs),
        ];
        for (section, base_url, timeout_secs) in endpoints {
            url::Url::parse(base_url).map_err(|e| {
                CityScoutError::config(format!("[{section}] base_url '{base_url}' is invalid: {e}"))
            })?;
            // A zero timeout fails every request before it is sent.
            if timeout_secs == 0 {
                return Err(CityScoutError::config(format!(
                    "[{section}] timeout_secs must be at least 1"
                )));
            }
        }

        if self.text_generation.models.is_empty() {
            return Err(CityScoutError::config(
                "[text_generation] models must list at least one model",
            ));
        }

        for entry in &self.knowledge {
            if entry.city.trim().is_empty() {
                return Err(CityScoutError::config("[[knowledge]] entry has an empty city"));
            }
            if !(-90.0..=90.0).contains(&entry.latitude)
                || !(-180.0..=180.0).contains(&entry.longitude)
            {
                return Err(CityScoutError::config(format!(
                    "[[knowledge]] '{}' has out-of-range coordinates",
                    entry.city
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.cityscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CityScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.cityscout/cityscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CityScoutError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        CityScoutError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_at(&config_dir()?)
}

/// Write a default config file into `dir`, creating it if needed.
pub fn init_config_at(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| CityScoutError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CityScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CityScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
