//! Probe Log Outage Engine: deterministic, batch analysis of ping logs.
//!
//! Debounces per-device timeouts and latency spikes into incident intervals,
//! then intersects the failure intervals of all devices on a subnet to find
//! periods where the whole network was unreachable.
//!
//! No DB, no network; pure computation over one ordered pass.

pub mod aggregator;
pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod intersect;
pub mod parse;
pub mod report;
pub mod subnet;
pub mod types;

pub use config::{Config, RawConfig};
pub use engine::{analyze, analyze_results, analyze_with, Engine};
pub use error::EngineError;
pub use types::{Analysis, Incident, IncidentKind, Interval, Sample};
