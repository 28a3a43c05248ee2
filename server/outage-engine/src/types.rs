//! Core types for the outage engine (samples, incidents, intervals, results).

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Probe timestamps carry no zone; the log is written in the prober's local time.
pub type Timestamp = NaiveDateTime;

/// Device address as written in the log, e.g. `10.10.10.1/24`.
pub type DeviceId = String;

/// Network address in CIDR form, e.g. `10.10.10.0/24`.
pub type SubnetId = String;

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

/// One probe result. `latency == None` means the probe timed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
  pub time: Timestamp,
  pub device_id: DeviceId,
  pub latency: Option<u32>,
}

impl Sample {
  pub fn new(time: Timestamp, device_id: impl Into<DeviceId>, latency: Option<u32>) -> Self {
    Self {
      time,
      device_id: device_id.into(),
      latency,
    }
  }
}

// ---------------------------------------------------------------------------
// Incidents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentKind {
  Failure,
  Overload,
}

impl fmt::Display for IncidentKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      IncidentKind::Failure => write!(f, "failure"),
      IncidentKind::Overload => write!(f, "overload"),
    }
  }
}

/// A finalized incident for a device or a subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Incident {
  pub kind: IncidentKind,
  /// Device address for device incidents, network address for subnet incidents.
  pub subject_id: String,
  pub start: Timestamp,
  /// `None` while the condition still held at the end of the log.
  pub end: Option<Timestamp>,
  /// Consecutive qualifying samples in the run.
  ///
  /// Subnet incidents are derived from intervals, not samples, and always
  /// carry 0 here.
  pub sample_count: u32,
}

impl Incident {
  pub fn interval(&self) -> Interval {
    Interval {
      start: self.start,
      end: self.end,
    }
  }

  pub fn is_open(&self) -> bool {
    self.end.is_none()
  }

  /// Length of a closed incident.
  pub fn duration(&self) -> Option<chrono::Duration> {
    self.end.map(|end| end - self.start)
  }
}

/// Incidents of one subject and one kind, non-overlapping, ascending by start.
pub type DeviceIncidentSet = Vec<Incident>;

// ---------------------------------------------------------------------------
// Intervals
// ---------------------------------------------------------------------------

/// Right-open time range; `end == None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
  pub start: Timestamp,
  pub end: Option<Timestamp>,
}

impl Interval {
  pub fn new(start: Timestamp, end: Option<Timestamp>) -> Self {
    Self { start, end }
  }

  pub fn is_empty(&self) -> bool {
    matches!(self.end, Some(end) if end <= self.start)
  }
}

// ---------------------------------------------------------------------------
// Analysis output
// ---------------------------------------------------------------------------

/// Result of one analysis run. Ordered maps keep report output deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
  pub device_failures: BTreeMap<DeviceId, DeviceIncidentSet>,
  pub device_overloads: BTreeMap<DeviceId, DeviceIncidentSet>,
  pub subnet_failures: BTreeMap<SubnetId, DeviceIncidentSet>,
}

impl Analysis {
  pub fn incident_count(&self) -> usize {
    self.device_failures.values().map(Vec::len).sum::<usize>()
      + self.device_overloads.values().map(Vec::len).sum::<usize>()
      + self.subnet_failures.values().map(Vec::len).sum::<usize>()
  }
}
