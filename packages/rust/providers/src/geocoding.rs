//! Open-Meteo geocoding search and candidate disambiguation.

use cityscout_shared::{Coordinates, GeocodingConfig, ProviderError, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::http::{build_client, classify_status, classify_transport, endpoint};

/// GeoNames feature codes in priority order: national capital, first-order
/// admin seat, second/third-order admin seats, generic populated place.
pub const FEATURE_CODE_PRIORITY: [&str; 5] = ["PPLC", "PPLA", "PPLA2", "PPLA3", "PPL"];

/// Regions preferred when several same-class candidates share a name.
pub const TOURIST_REGIONS: [&str; 16] = [
    "Himachal Pradesh",
    "Uttarakhand",
    "Goa",
    "Kerala",
    "Rajasthan",
    "Kashmir",
    "Sikkim",
    "Meghalaya",
    "Bali",
    "Tuscany",
    "Provence",
    "Bavaria",
    "Tyrol",
    "Queensland",
    "California",
    "Hawaii",
];

/// One search result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoCandidate {
    #[serde(default)]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub feature_code: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub population: Option<u64>,
}

impl GeoCandidate {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    fn population(&self) -> u64 {
        self.population.unwrap_or(0)
    }

    fn in_tourist_region(&self) -> bool {
        self.admin1
            .as_deref()
            .is_some_and(|region| TOURIST_REGIONS.contains(&region))
    }
}

/// Why [`rank_candidates`] picked a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankReason {
    /// Best tourist-region match within the given feature-code class.
    TouristRegion(&'static str),
    /// Most populous candidate within the given feature-code class.
    FeatureClass(&'static str),
    /// No class matched; most populous candidate overall.
    Population,
    /// Nothing to rank on; the service's first result.
    FirstResult,
}

/// Pick the best candidate for `query`.
///
/// 1. Keep only case-insensitive exact name matches, if there are any.
/// 2. Walk [`FEATURE_CODE_PRIORITY`]; in the first class present, prefer
///    [`TOURIST_REGIONS`] candidates, then population.
/// 3. Otherwise the most populous candidate with a positive population.
/// 4. Otherwise the first candidate.
///
/// Population ties resolve to the earliest candidate in service order.
pub fn rank_candidates<'a>(
    query: &str,
    candidates: &'a [GeoCandidate],
) -> Option<(&'a GeoCandidate, RankReason)> {
    let first = candidates.first()?;

    let query = query.trim().to_lowercase();
    let exact: Vec<&GeoCandidate> = candidates
        .iter()
        .filter(|c| c.name.to_lowercase() == query)
        .collect();
    let pool: Vec<&GeoCandidate> = if exact.is_empty() {
        candidates.iter().collect()
    } else {
        exact
    };

    for code in FEATURE_CODE_PRIORITY {
        let class: Vec<&GeoCandidate> = pool
            .iter()
            .copied()
            .filter(|c| c.feature_code.as_deref() == Some(code))
            .collect();
        if class.is_empty() {
            continue;
        }

        let tourist = most_populous(class.iter().copied().filter(|c| c.in_tourist_region()));
        if let Some(best) = tourist {
            return Some((best, RankReason::TouristRegion(code)));
        }
        if let Some(best) = most_populous(class.iter().copied()) {
            return Some((best, RankReason::FeatureClass(code)));
        }
    }

    if let Some(best) = most_populous(pool.iter().copied().filter(|c| c.population() > 0)) {
        return Some((best, RankReason::Population));
    }

    Some((pool.first().copied().unwrap_or(first), RankReason::FirstResult))
}

/// Highest population, earliest wins on ties.
fn most_populous<'a>(iter: impl Iterator<Item = &'a GeoCandidate>) -> Option<&'a GeoCandidate> {
    iter.fold(None, |best: Option<&GeoCandidate>, c| match best {
        Some(b) if b.population() >= c.population() => Some(b),
        _ => Some(c),
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<GeoCandidate>,
}

/// Open-Meteo geocoding search client.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    base_url: String,
    max_candidates: u32,
    http: Client,
}

impl GeocodingClient {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            max_candidates: config.max_candidates,
            http: build_client(config.timeout())?,
        })
    }

    /// Search for places named `name`. An empty result set is an `Empty` failure.
    #[instrument(skip(self))]
    pub async fn search(&self, name: &str) -> std::result::Result<Vec<GeoCandidate>, ProviderError> {
        let url = endpoint(&self.base_url, "v1/search")
            .map_err(|e| ProviderError::malformed(e.to_string()))?;
        let count = self.max_candidates.to_string();

        let response = self
            .http
            .get(url)
            .query(&[
                ("name", name),
                ("count", count.as_str()),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| classify_transport(&e))?;
        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::malformed(format!("geocoding body: {e}")))?;
        if parsed.results.is_empty() {
            return Err(ProviderError::empty(format!("no places named '{name}'")));
        }

        debug!(results = parsed.results.len(), "geocoding candidates");
        Ok(parsed.results)
    }
}
