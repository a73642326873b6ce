//! City name to coordinates: lookup table, then geocoding, then a fixed default.

use std::sync::Arc;

use cityscout_knowledge::KnowledgeBase;
use cityscout_providers::{GeocodingClient, rank_candidates};
use cityscout_shared::{Coordinates, Failure, ProviderError, Source, Sourced};
use tracing::{debug, instrument, warn};

/// Used when a city cannot be placed (central Paris).
pub const DEFAULT_COORDINATES: Coordinates = Coordinates::new(48.8566, 2.3522);

/// Provider name recorded for geocoded coordinates.
const GEOCODING_PROVIDER: &str = "open-meteo geocoding";

pub struct CoordinateResolver {
    knowledge: Arc<dyn KnowledgeBase>,
    geocoder: GeocodingClient,
}

impl CoordinateResolver {
    pub fn new(knowledge: Arc<dyn KnowledgeBase>, geocoder: GeocodingClient) -> Self {
        Self {
            knowledge,
            geocoder,
        }
    }

    /// Resolve `city`. Never fails; falls back to [`DEFAULT_COORDINATES`].
    #[instrument(skip_all, fields(city = %city))]
    pub async fn resolve(&self, city: &str) -> Sourced<Coordinates> {
        if let Some(entry) = self.knowledge.lookup(city) {
            debug!("coordinates from lookup table");
            return Sourced::new(entry.coordinates(), Source::KnowledgeBase);
        }

        let error = match self.geocoder.search(city.trim()).await {
            Ok(candidates) => match rank_candidates(city, &candidates) {
                Some((pick, reason)) => {
                    debug!(
                        name = %pick.name,
                        admin1 = pick.admin1.as_deref().unwrap_or("-"),
                        ?reason,
                        "geocoding candidate selected"
                    );
                    return Sourced::new(pick.coordinates(), Source::live(GEOCODING_PROVIDER));
                }
                None => ProviderError::empty("no candidates to rank"),
            },
            Err(e) => e,
        };

        warn!(%error, default = %DEFAULT_COORDINATES, "geocoding failed, using default coordinates");
        Sourced::new(
            DEFAULT_COORDINATES,
            Source::Synthetic {
                failures: vec![Failure::new(GEOCODING_PROVIDER, error)],
            },
        )
    }
}
