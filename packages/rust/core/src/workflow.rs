//! The query workflow: route check, one knowledge step, weather, images.
//!
//! Each step consumes the record produced by the previous one and returns the
//! next, so a field can only be written by the step that owns it and cannot be
//! read before that step has run.

use std::sync::Arc;
use std::time::Instant;

use cityscout_knowledge::{KnowledgeBase, StaticKnowledgeBase};
use cityscout_providers::{
    CredentialProvider, EnvCredentials, ForecastClient, GeminiClient, GeocodingClient, PhotoClient,
};
use cityscout_shared::{
    AppConfig, CityScoutError, Coordinates, DailyForecast, LookupEntry, Provenance, Result,
    Source, Sourced, Step, WorkflowState,
};
use tracing::{debug, info, instrument};

use crate::coordinates::CoordinateResolver;
use crate::images::ImageAdapter;
use crate::knowledge::{RemoteSummarizer, local_summary};
use crate::weather::WeatherAdapter;

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Progress callback for step transitions.
pub trait WorkflowObserver: Send + Sync {
    /// Called before `step` runs.
    fn step_started(&self, step: Step);
    /// Called after `step` ran. `source` is set for steps that write a sourced value.
    fn step_finished(&self, step: Step, source: Option<&Source>);
}

/// No-op observer for headless/test usage.
pub struct SilentObserver;

impl WorkflowObserver for SilentObserver {
    fn step_started(&self, _step: Step) {}
    fn step_finished(&self, _step: Step, _source: Option<&Source>) {}
}

// ---------------------------------------------------------------------------
// Stage records
// ---------------------------------------------------------------------------

/// Validated input, not yet routed.
#[derive(Debug)]
struct Pending {
    city: String,
}

impl Pending {
    fn new(city: &str) -> Result<Self> {
        let city = city.trim();
        if city.is_empty() {
            return Err(CityScoutError::validation("city name must not be empty"));
        }
        Ok(Self {
            city: city.to_string(),
        })
    }
}

/// Which knowledge step the route check selected.
#[derive(Debug)]
enum Route {
    Local(LookupEntry),
    Remote,
}

#[derive(Debug)]
struct Routed {
    city: String,
    route: Route,
}

impl Routed {
    fn in_knowledge_base(&self) -> bool {
        matches!(self.route, Route::Local(_))
    }

    fn next_step(&self) -> Step {
        match self.route {
            Route::Local(_) => Step::KnowledgeLocal,
            Route::Remote => Step::KnowledgeRemote,
        }
    }
}

#[derive(Debug)]
struct Summarized {
    city: String,
    in_knowledge_base: bool,
    summary: Sourced<String>,
}

#[derive(Debug)]
struct Forecasted {
    summarized: Summarized,
    coordinates: Sourced<Coordinates>,
    forecast: Sourced<Vec<DailyForecast>>,
}

#[derive(Debug)]
struct Illustrated {
    forecasted: Forecasted,
    images: Sourced<Vec<String>>,
}

impl Illustrated {
    fn into_state(self, trace: Vec<Step>) -> WorkflowState {
        let Illustrated { forecasted, images } = self;
        let Forecasted {
            summarized,
            coordinates,
            forecast,
        } = forecasted;

        WorkflowState {
            city: summarized.city,
            in_knowledge_base: Some(summarized.in_knowledge_base),
            summary: summarized.summary.value,
            forecast: forecast.value,
            images: images.value,
            coordinates: Some(coordinates.value),
            provenance: Provenance {
                summary: Some(summarized.summary.source),
                coordinates: Some(coordinates.source),
                forecast: Some(forecast.source),
                images: Some(images.source),
            },
            trace,
        }
    }
}

/// Executed steps, forwarded to the observer as they happen.
struct Trace<'a> {
    steps: Vec<Step>,
    observer: &'a dyn WorkflowObserver,
}

impl<'a> Trace<'a> {
    fn new(observer: &'a dyn WorkflowObserver) -> Self {
        Self {
            steps: Vec::with_capacity(Step::ALL.len() - 1),
            observer,
        }
    }

    fn enter(&mut self, step: Step) {
        debug!(%step, "step started");
        self.steps.push(step);
        self.observer.step_started(step);
    }

    fn leave(&self, step: Step, source: Option<&Source>) {
        self.observer.step_finished(step, source);
    }

    /// A step with no work of its own.
    fn pass(&mut self, step: Step) {
        self.enter(step);
        self.leave(step, None);
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The workflow engine. Holds read-only data and HTTP clients only, so one
/// instance can serve concurrent queries.
pub struct Workflow {
    knowledge: Arc<dyn KnowledgeBase>,
    summarizer: RemoteSummarizer,
    coordinates: CoordinateResolver,
    weather: WeatherAdapter,
    images: ImageAdapter,
}

impl Workflow {
    /// Build the engine and its adapters from config.
    pub fn from_config(
        config: &AppConfig,
        knowledge: Arc<dyn KnowledgeBase>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        let text = GeminiClient::new(&config.text_generation)?;
        Ok(Self {
            summarizer: RemoteSummarizer::new(
                text.clone(),
                config.text_generation.models.clone(),
                Arc::clone(&credentials),
            ),
            coordinates: CoordinateResolver::new(
                Arc::clone(&knowledge),
                GeocodingClient::new(&config.geocoding)?,
            ),
            weather: WeatherAdapter::new(
                ForecastClient::new(&config.weather)?,
                Arc::clone(&credentials),
            ),
            images: ImageAdapter::new(
                text,
                config.text_generation.landmark_models.clone(),
                PhotoClient::new(&config.photos)?,
                credentials,
            ),
            knowledge,
        })
    }

    /// The engine as the CLI runs it: built-in table plus configured entries,
    /// keys from the environment variables named in the config.
    pub fn with_defaults(config: &AppConfig) -> Result<Self> {
        let knowledge = StaticKnowledgeBase::with_overrides(config.knowledge.iter().cloned());
        let credentials = EnvCredentials::from_config(config);
        Self::from_config(config, Arc::new(knowledge), Arc::new(credentials))
    }

    /// Run one query to completion.
    ///
    /// The only error is a blank `city`; every external failure is absorbed
    /// by its adapter and reported through [`WorkflowState::provenance`].
    #[instrument(skip_all, fields(city = %city))]
    pub async fn run(&self, city: &str, observer: &dyn WorkflowObserver) -> Result<WorkflowState> {
        let started = Instant::now();
        let pending = Pending::new(city)?;
        let mut trace = Trace::new(observer);

        // --- Start ---
        trace.pass(Step::Start);

        // --- Route check ---
        trace.enter(Step::RouteCheck);
        let routed = self.route(pending);
        trace.leave(Step::RouteCheck, None);

        // --- Knowledge (exactly one branch) ---
        let step = routed.next_step();
        trace.enter(step);
        let summarized = self.summarize(routed).await;
        trace.leave(step, Some(&summarized.summary.source));

        // --- Weather ---
        trace.enter(Step::Weather);
        let forecasted = self.forecast(summarized).await;
        trace.leave(Step::Weather, Some(&forecasted.forecast.source));

        // --- Images ---
        trace.enter(Step::Images);
        let illustrated = self.illustrate(forecasted).await;
        trace.leave(Step::Images, Some(&illustrated.images.source));

        // --- End ---
        trace.pass(Step::End);

        let state = illustrated.into_state(trace.steps);
        info!(
            in_knowledge_base = ?state.in_knowledge_base,
            degraded = state.provenance.is_degraded(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "workflow complete"
        );
        Ok(state)
    }

    fn route(&self, pending: Pending) -> Routed {
        let route = match self.knowledge.lookup(&pending.city) {
            Some(entry) => Route::Local(entry.clone()),
            None => Route::Remote,
        };
        let routed = Routed {
            city: pending.city,
            route,
        };
        debug!(in_knowledge_base = routed.in_knowledge_base(), "routed");
        routed
    }

    async fn summarize(&self, routed: Routed) -> Summarized {
        let in_knowledge_base = routed.in_knowledge_base();
        let summary = match &routed.route {
            Route::Local(entry) => local_summary(entry),
            Route::Remote => self.summarizer.summarize(&routed.city).await,
        };
        Summarized {
            city: routed.city,
            in_knowledge_base,
            summary,
        }
    }

    async fn forecast(&self, summarized: Summarized) -> Forecasted {
        let coordinates = self.coordinates.resolve(&summarized.city).await;
        let forecast = self.weather.forecast(coordinates.value).await;
        Forecasted {
            summarized,
            coordinates,
            forecast,
        }
    }

    async fn illustrate(&self, forecasted: Forecasted) -> Illustrated {
        let images = self.images.images(&forecasted.summarized.city).await;
        Illustrated { forecasted, images }
    }
}
