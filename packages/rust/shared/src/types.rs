//! Core domain types for a CityScout query.

use serde::{Deserialize, Serialize};

use crate::error::Failure;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

// ---------------------------------------------------------------------------
// LookupEntry
// ---------------------------------------------------------------------------

/// Pre-authored facts about one city in the lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupEntry {
    /// Display name as authored (e.g. `New York`).
    pub city: String,
    pub summary: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LookupEntry {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

// ---------------------------------------------------------------------------
// DailyForecast
// ---------------------------------------------------------------------------

/// One day of the forecast series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Degrees Celsius.
    pub temp_max: f64,
    /// Degrees Celsius.
    pub temp_min: f64,
    /// Millimetres.
    pub precipitation: f64,
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Where a value written into the workflow state came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum Source {
    /// Read from the local lookup table, no I/O.
    KnowledgeBase,
    /// Produced by a live external call. `provider` names the model or service.
    Live { provider: String },
    /// Deterministic substitute; `failures` lists every attempt that failed.
    Synthetic { failures: Vec<Failure> },
}

impl Source {
    pub fn live(provider: impl Into<String>) -> Self {
        Self::Live {
            provider: provider.into(),
        }
    }

    /// `true` when the value is a synthetic substitute.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Synthetic { .. })
    }

    /// Failed attempts recorded for this value (empty for non-synthetic values).
    pub fn failures(&self) -> &[Failure] {
        match self {
            Self::Synthetic { failures } => failures,
            _ => &[],
        }
    }
}

/// A value together with its [`Source`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Sourced<T> {
    pub fn new(value: T, source: Source) -> Self {
        Self { value, source }
    }
}

/// Per-field provenance of a finished [`WorkflowState`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Source>,
}

impl Provenance {
    /// `true` if any populated field was synthesized.
    pub fn is_degraded(&self) -> bool {
        [&self.summary, &self.coordinates, &self.forecast, &self.images]
            .into_iter()
            .flatten()
            .any(Source::is_degraded)
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// The named nodes of the workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Start,
    RouteCheck,
    KnowledgeLocal,
    KnowledgeRemote,
    Weather,
    Images,
    End,
}

impl Step {
    /// Every step, in topological order.
    pub const ALL: [Step; 7] = [
        Step::Start,
        Step::RouteCheck,
        Step::KnowledgeLocal,
        Step::KnowledgeRemote,
        Step::Weather,
        Step::Images,
        Step::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::RouteCheck => "route_check",
            Self::KnowledgeLocal => "knowledge_local",
            Self::KnowledgeRemote => "knowledge_remote",
            Self::Weather => "weather",
            Self::Images => "images",
            Self::End => "end",
        }
    }

    /// Human-readable label used by progress reporting and diagrams.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::RouteCheck => "Checking knowledge base",
            Self::KnowledgeLocal => "Reading knowledge base",
            Self::KnowledgeRemote => "Generating summary",
            Self::Weather => "Fetching weather",
            Self::Images => "Fetching images",
            Self::End => "End",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WorkflowState
// ---------------------------------------------------------------------------

/// The record handed to the presentation layer after a query.
///
/// `in_knowledge_base` keeps its tri-state: `None` means routing has not run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub city: String,
    pub in_knowledge_base: Option<bool>,
    pub summary: String,
    pub forecast: Vec<DailyForecast>,
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub provenance: Provenance,
    #[serde(default)]
    pub trace: Vec<Step>,
}

impl WorkflowState {
    /// The initial, not-yet-routed state for `city`.
    pub fn pending(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            in_knowledge_base: None,
            summary: String::new(),
            forecast: Vec::new(),
            images: Vec::new(),
            coordinates: None,
            provenance: Provenance::default(),
            trace: Vec::new(),
        }
    }
}
