//! Workflow engine and service adapters for CityScout.
//!
//! This crate ties the lookup table and the HTTP providers together into the
//! query workflow (`Workflow::run`): route check, one knowledge step, weather,
//! then images. Every adapter is total: external failures become synthetic
//! values with provenance instead of errors.

pub mod coordinates;
pub mod graph;
pub mod images;
pub mod knowledge;
pub mod weather;
pub mod workflow;

pub use coordinates::{CoordinateResolver, DEFAULT_COORDINATES};
pub use graph::{DEFAULT_DIAGRAM_PATH, EDGES, Edge, export_diagram, successors, to_mermaid};
pub use images::{IMAGE_COUNT, ImageAdapter};
pub use knowledge::RemoteSummarizer;
pub use weather::{WeatherAdapter, synthetic_forecast};
pub use workflow::{SilentObserver, Workflow, WorkflowObserver};
