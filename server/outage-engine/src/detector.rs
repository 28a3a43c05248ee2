//! Per-device debounced incident detection.
//!
//! A `Detector` turns one device's samples into confirmed incidents of a
//! single kind. A run of qualifying samples is held in an accumulator and is
//! only emitted when it closes (or the log ends) with at least `tolerance`
//! samples. A confirmed run keeps its original start time.

use tracing::debug;

use crate::config::Config;
use crate::error::EngineError;
use crate::types::{Incident, IncidentKind, Sample, Timestamp};

/// Which samples count toward a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
  /// The probe timed out.
  Unreachable,
  /// The probe answered slower than `threshold`.
  Overloaded { threshold: u32 },
}

impl Condition {
  pub fn kind(self) -> IncidentKind {
    match self {
      Condition::Unreachable => IncidentKind::Failure,
      Condition::Overloaded { .. } => IncidentKind::Overload,
    }
  }

  pub fn qualifies(self, latency: Option<u32>) -> bool {
    match self {
      Condition::Unreachable => latency.is_none(),
      Condition::Overloaded { threshold } => matches!(latency, Some(ms) if ms > threshold),
    }
  }
}

#[derive(Debug, Clone)]
struct Run {
  start: Timestamp,
  count: u32,
}

/// Debounced state machine for one `(device, condition)` pair.
#[derive(Debug, Clone)]
pub struct Detector {
  device_id: String,
  condition: Condition,
  tolerance: u32,
  current: Option<Run>,
}

impl Detector {
  pub fn new(device_id: impl Into<String>, condition: Condition, tolerance: u32) -> Self {
    Self {
      device_id: device_id.into(),
      condition,
      tolerance: Config::effective(tolerance),
      current: None,
    }
  }

  /// Feed one sample. Returns an incident when a confirmed run closes on it.
  pub fn observe(&mut self, time: Timestamp, latency: Option<u32>) -> Option<Incident> {
    if self.condition.qualifies(latency) {
      match self.current.as_mut() {
        Some(run) => run.count = run.count.saturating_add(1),
        None => self.current = Some(Run { start: time, count: 1 }),
      }
      return None;
    }

    let run = self.current.take()?;
    self.confirm(run, Some(time))
  }

  /// Flush at end of log: a confirmed run stays open (`end = None`).
  pub fn finish(mut self) -> Option<Incident> {
    let run = self.current.take()?;
    self.confirm(run, None)
  }

  fn confirm(&self, run: Run, end: Option<Timestamp>) -> Option<Incident> {
    if run.count < self.tolerance {
      debug!(
        device = %self.device_id,
        kind = %self.condition.kind(),
        samples = run.count,
        tolerance = self.tolerance,
        "run below tolerance discarded"
      );
      return None;
    }

    debug!(
      device = %self.device_id,
      kind = %self.condition.kind(),
      start = %run.start,
      open = end.is_none(),
      samples = run.count,
      "incident confirmed"
    );
    Some(Incident {
      kind: self.condition.kind(),
      subject_id: self.device_id.clone(),
      start: run.start,
      end,
      sample_count: run.count,
    })
  }
}

/// All detector state for one device, built fresh for every analysis run.
#[derive(Debug, Clone)]
pub struct DeviceMonitor {
  device_id: String,
  last_seen: Option<Timestamp>,
  failure: Detector,
  overload: Option<Detector>,
}

impl DeviceMonitor {
  pub fn new(device_id: &str, config: &Config) -> Self {
    Self {
      device_id: device_id.to_string(),
      last_seen: None,
      failure: Detector::new(device_id, Condition::Unreachable, config.failure_tolerance),
      overload: config.overload_threshold.map(|threshold| {
        Detector::new(device_id, Condition::Overloaded { threshold }, config.overload_tolerance)
      }),
    }
  }

  /// Feed one sample for this device and collect any incidents it closes.
  ///
  /// Samples must arrive in strictly increasing time order.
  pub fn observe(&mut self, sample: &Sample, emitted: &mut Vec<Incident>) -> Result<(), EngineError> {
    if let Some(prev) = self.last_seen {
      if sample.time <= prev {
        return Err(EngineError::malformed(
          &self.device_id,
          format!("sample at {} is not after previous sample at {}", sample.time, prev),
        ));
      }
    }
    self.last_seen = Some(sample.time);

    emitted.extend(self.failure.observe(sample.time, sample.latency));
    if let Some(overload) = self.overload.as_mut() {
      emitted.extend(overload.observe(sample.time, sample.latency));
    }
    Ok(())
  }

  /// Flush both detectors at end of log.
  pub fn finish(self, emitted: &mut Vec<Incident>) {
    emitted.extend(self.failure.finish());
    if let Some(overload) = self.overload {
      emitted.extend(overload.finish());
    }
  }
}
