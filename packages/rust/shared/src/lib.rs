//! Shared types, error model, and configuration for CityScout.
//!
//! This crate is the foundation depended on by all other CityScout crates.
//! It provides:
//! - [`CityScoutError`] and the provider failure taxonomy ([`ProviderError`], [`FailureKind`])
//! - Domain types ([`WorkflowState`], [`DailyForecast`], [`LookupEntry`], [`Step`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, GeocodingConfig, PhotosConfig, TextGenerationConfig, WeatherConfig, config_dir,
    config_file_path, init_config, init_config_at, load_config, load_config_from,
};
pub use error::{CityScoutError, Failure, FailureKind, ProviderError, Result};
pub use types::{
    Coordinates, DailyForecast, LookupEntry, Provenance, Source, Sourced, Step, WorkflowState,
};
