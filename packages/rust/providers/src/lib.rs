//! HTTP clients for the external services CityScout talks to.
//!
//! This crate provides:
//! - [`GeminiClient`] — generative text (`generateContent`)
//! - [`GeocodingClient`] and [`rank_candidates`] — place search and disambiguation
//! - [`ForecastClient`] — daily weather forecast
//! - [`PhotoClient`] — landscape photo search
//! - [`credentials`] — API key lookup at call time
//! - [`fallback`] — ordered candidate chains with a terminal synthetic value
//!
//! Every client method returns `Result<_, ProviderError>`; deciding what to
//! substitute on failure is left to the caller.

pub mod credentials;
pub mod fallback;
pub mod forecast;
pub mod gemini;
pub mod geocoding;
mod http;
pub mod photos;

pub use credentials::{CredentialProvider, EnvCredentials, Service, StaticCredentials};
pub use fallback::{ChainOutcome, first_success};
pub use forecast::{FORECAST_DAYS, ForecastClient};
pub use gemini::GeminiClient;
pub use geocoding::{GeoCandidate, GeocodingClient, RankReason, rank_candidates};
pub use photos::PhotoClient;
