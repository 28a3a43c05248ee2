//! Core engine: one pass over the samples, then aggregation and intersection.

use std::collections::BTreeMap;

use tracing::info;

use crate::aggregator;
use crate::config::Config;
use crate::detector::DeviceMonitor;
use crate::error::EngineError;
use crate::intersect;
use crate::subnet;
use crate::types::*;

/// The outage analysis engine. Holds per-device detector state for one run.
pub struct Engine<F = fn(&str) -> SubnetId> {
  config: Config,
  subnet_of: F,
  monitors: BTreeMap<DeviceId, DeviceMonitor>,
  emitted: Vec<Incident>,
  samples_seen: u64,
}

impl Engine {
  /// Engine using CIDR subnet mapping.
  pub fn new(config: Config) -> Self {
    Self::with_subnet_fn(config, subnet::subnet_of)
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }
}

impl<F> Engine<F>
where
  F: Fn(&str) -> SubnetId,
{
  /// Engine with a caller-supplied device-to-subnet mapping.
  pub fn with_subnet_fn(config: Config, subnet_of: F) -> Self {
    Self {
      config,
      subnet_of,
      monitors: BTreeMap::new(),
      emitted: Vec::new(),
      samples_seen: 0,
    }
  }

  /// Feed one sample.
  ///
  /// Fails on a sample that is not strictly after the previous sample of the
  /// same device; the run should then be abandoned.
  pub fn ingest(&mut self, sample: &Sample) -> Result<(), EngineError> {
    let config = &self.config;
    let monitor = self
      .monitors
      .entry(sample.device_id.clone())
      .or_insert_with(|| DeviceMonitor::new(&sample.device_id, config));
    monitor.observe(sample, &mut self.emitted)?;
    self.samples_seen += 1;
    Ok(())
  }

  /// Flush open runs and derive device- and subnet-level incident sets.
  pub fn finish(self) -> Analysis {
    let Engine {
      config,
      subnet_of,
      monitors,
      mut emitted,
      samples_seen,
    } = self;

    let device_ids: Vec<DeviceId> = monitors.keys().cloned().collect();
    for monitor in monitors.into_values() {
      monitor.finish(&mut emitted);
    }

    let (failures, overloads): (Vec<Incident>, Vec<Incident>) =
      emitted.into_iter().partition(|i| i.kind == IncidentKind::Failure);

    // Every observed device gets a failure entry, even with no incidents;
    // overload entries exist only when overload detection is enabled.
    let mut device_failures = aggregator::group_by_device(failures);
    let mut device_overloads = aggregator::group_by_device(overloads);
    for id in &device_ids {
      device_failures.entry(id.clone()).or_default();
      if config.overload_threshold.is_some() {
        device_overloads.entry(id.clone()).or_default();
      }
    }

    let subnets = aggregator::devices_of_subnet(&device_ids, &subnet_of);
    let subnet_failures: BTreeMap<SubnetId, DeviceIncidentSet> = subnets
      .iter()
      .map(|(subnet_id, members)| {
        let sets: Vec<&DeviceIncidentSet> = members.iter().map(|id| &device_failures[id]).collect();
        (subnet_id.clone(), intersect::subnet_failures(subnet_id, &sets))
      })
      .collect();

    let analysis = Analysis {
      device_failures,
      device_overloads,
      subnet_failures,
    };

    info!(
      samples = samples_seen,
      devices = device_ids.len(),
      subnets = subnets.len(),
      incidents = analysis.incident_count(),
      "analysis complete"
    );
    analysis
  }
}

/// Analyze a complete, time-ordered sample sequence with CIDR subnet mapping.
pub fn analyze<I>(samples: I, config: &Config) -> Result<Analysis, EngineError>
where
  I: IntoIterator<Item = Sample>,
{
  analyze_with(samples, config, subnet::subnet_of)
}

/// Analyze with a caller-supplied subnet mapping.
pub fn analyze_with<I, F>(samples: I, config: &Config, subnet_of: F) -> Result<Analysis, EngineError>
where
  I: IntoIterator<Item = Sample>,
  F: Fn(&str) -> SubnetId,
{
  analyze_results(samples.into_iter().map(Ok), config, subnet_of)
}

/// Analyze a fallible sample stream (e.g. a log being parsed); the first error aborts the run.
pub fn analyze_results<I, F>(samples: I, config: &Config, subnet_of: F) -> Result<Analysis, EngineError>
where
  I: IntoIterator<Item = Result<Sample, EngineError>>,
  F: Fn(&str) -> SubnetId,
{
  let mut engine = Engine::with_subnet_fn(config.clone(), subnet_of);
  for sample in samples {
    engine.ingest(&sample?)?;
  }
  Ok(engine.finish())
}
