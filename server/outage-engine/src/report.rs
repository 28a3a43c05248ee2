//! Render an `Analysis` as a text report or as JSON lines.

use std::io::{self, Write};

use chrono::Duration;
use serde::Serialize;

use crate::types::{Analysis, Incident, IncidentKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
  Device,
  Subnet,
}

/// One emitted incident line (JSON contract).
#[derive(Debug, Clone, Serialize)]
pub struct IncidentRecord {
  pub incident_id: String,
  pub scope: Scope,
  pub kind: IncidentKind,
  pub subject: String,
  pub start: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub end: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration_secs: Option<i64>,
  /// Omitted for subnet incidents, which are not built from samples.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sample_count: Option<u32>,
}

/// Stable ID: hash of scope + kind + subject + start.
pub fn incident_id(scope: Scope, incident: &Incident) -> String {
  let mut hasher = blake3::Hasher::new();
  hasher.update(match scope {
    Scope::Device => b"device",
    Scope::Subnet => b"subnet",
  });
  hasher.update(b"|");
  hasher.update(incident.kind.to_string().as_bytes());
  hasher.update(b"|");
  hasher.update(incident.subject_id.as_bytes());
  hasher.update(b"|");
  hasher.update(incident.start.format("%Y-%m-%dT%H:%M:%S").to_string().as_bytes());
  let hex = hasher.finalize().to_hex();
  format!("inc-{}", &hex[..16])
}

impl IncidentRecord {
  pub fn new(scope: Scope, incident: &Incident) -> Self {
    Self {
      incident_id: incident_id(scope, incident),
      scope,
      kind: incident.kind,
      subject: incident.subject_id.clone(),
      start: incident.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
      end: incident.end.map(|e| e.format("%Y-%m-%dT%H:%M:%S").to_string()),
      duration_secs: incident.duration().map(|d| d.num_seconds()),
      sample_count: match scope {
        Scope::Device => Some(incident.sample_count),
        Scope::Subnet => None,
      },
    }
  }
}

/// All incidents in report order: device failures, device overloads, subnet failures.
pub fn records(analysis: &Analysis) -> Vec<IncidentRecord> {
  let device = analysis
    .device_failures
    .values()
    .chain(analysis.device_overloads.values())
    .flatten()
    .map(|i| IncidentRecord::new(Scope::Device, i));
  let subnet = analysis
    .subnet_failures
    .values()
    .flatten()
    .map(|i| IncidentRecord::new(Scope::Subnet, i));
  device.chain(subnet).collect()
}

/// `H:MM:SS`, with a leading day count for long incidents.
pub fn format_duration(d: Duration) -> String {
  let total = d.num_seconds();
  let (days, rem) = (total / 86_400, total % 86_400);
  let (h, m, s) = (rem / 3600, (rem % 3600) / 60, rem % 60);
  if days > 0 {
    format!("{} day{}, {}:{:02}:{:02}", days, if days == 1 { "" } else { "s" }, h, m, s)
  } else {
    format!("{}:{:02}:{:02}", h, m, s)
  }
}

/// `start - end (duration)`; open incidents show `-` for end and duration.
pub fn format_period(incident: &Incident) -> String {
  let start = incident.start.format("%Y-%m-%d %H:%M:%S");
  if incident.is_open() {
    return format!("{} - - (-)", start);
  }
  let end = incident.end.unwrap_or(incident.start);
  format!("{} - {} ({})", start, end.format("%Y-%m-%d %H:%M:%S"), format_duration(end - incident.start))
}

pub fn write_text<W: Write>(out: &mut W, analysis: &Analysis) -> io::Result<()> {
  writeln!(out, "# Device incidents")?;
  for (device, failures) in &analysis.device_failures {
    writeln!(out, "=== {} ===", device)?;
    writeln!(out, "  --- failure periods ---")?;
    for incident in failures {
      writeln!(out, "  {}", format_period(incident))?;
    }
    if let Some(overloads) = analysis.device_overloads.get(device) {
      writeln!(out, "  --- overload periods ---")?;
      for incident in overloads {
        writeln!(out, "  {}", format_period(incident))?;
      }
    }
  }

  writeln!(out)?;
  writeln!(out, "# Network incidents")?;
  for (subnet, failures) in &analysis.subnet_failures {
    writeln!(out, "=== {} ===", subnet)?;
    for incident in failures {
      writeln!(out, "  {}", format_period(incident))?;
    }
  }
  Ok(())
}

pub fn write_json_lines<W: Write>(out: &mut W, analysis: &Analysis) -> io::Result<()> {
  for record in records(analysis) {
    serde_json::to_writer(&mut *out, &record)?;
    writeln!(out)?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;
  use std::collections::BTreeMap;

  fn incident(subject: &str, start_s: u32, end_s: Option<u32>, count: u32) -> Incident {
    let at = |s: u32| {
      NaiveDate::from_ymd_opt(2022, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::seconds(i64::from(s))
    };
    Incident {
      kind: IncidentKind::Failure,
      subject_id: subject.into(),
      start: at(start_s),
      end: end_s.map(at),
      sample_count: count,
    }
  }

  fn sample_analysis() -> Analysis {
    let mut device_failures = BTreeMap::new();
    device_failures.insert("10.0.0.1/24".to_string(), vec![incident("10.0.0.1/24", 10, Some(40), 3)]);
    let mut subnet_failures = BTreeMap::new();
    subnet_failures.insert("10.0.0.0/24".to_string(), vec![incident("10.0.0.0/24", 10, None, 0)]);
    Analysis {
      device_failures,
      device_overloads: BTreeMap::new(),
      subnet_failures,
    }
  }

  #[test]
  fn duration_formatting() {
    assert_eq!(format_duration(Duration::seconds(30)), "0:00:30");
    assert_eq!(format_duration(Duration::seconds(3_725)), "1:02:05");
    assert_eq!(format_duration(Duration::seconds(90_000)), "1 day, 1:00:00");
  }

  #[test]
  fn open_period_uses_dashes() {
    let open = incident("10.0.0.1/24", 0, None, 2);
    assert_eq!(format_period(&open), "2022-01-01 00:00:00 - - (-)");
  }

  #[test]
  fn text_report_has_both_sections() {
    let mut buf = Vec::new();
    write_text(&mut buf, &sample_analysis()).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("# Device incidents"));
    assert!(text.contains("=== 10.0.0.1/24 ==="));
    assert!(text.contains("2022-01-01 00:00:10 - 2022-01-01 00:00:40 (0:00:30)"));
    assert!(text.contains("# Network incidents"));
    assert!(text.contains("=== 10.0.0.0/24 ==="));
    assert!(!text.contains("overload periods"));
  }

  #[test]
  fn json_lines_are_stable_and_scoped() {
    let analysis = sample_analysis();
    let mut a = Vec::new();
    let mut b = Vec::new();
    write_json_lines(&mut a, &analysis).unwrap();
    write_json_lines(&mut b, &analysis).unwrap();
    assert_eq!(a, b);

    let text = String::from_utf8(a).unwrap();
    let lines: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["scope"], "device");
    assert_eq!(lines[0]["duration_secs"], 30);
    assert_eq!(lines[1]["scope"], "subnet");
    assert!(lines[1].get("end").is_none());
    assert!(lines[1].get("sample_count").is_none());
    assert!(lines[0]["incident_id"].as_str().unwrap().starts_with("inc-"));
  }
}
