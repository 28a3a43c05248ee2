//! Parse ping log lines into samples.
//!
//! Line format: `YYYYMMDDHHMMSS,<address>/<prefix>,<latency>` where the
//! latency is an integer or `-` for a timed-out probe.

use std::io::BufRead;

use chrono::NaiveDateTime;

use crate::error::EngineError;
use crate::subnet;
use crate::types::Sample;

pub const LOG_DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Parse one log line. `line_no` is 1-based and only used in errors.
pub fn parse_line(line: &str, line_no: usize) -> Result<Sample, EngineError> {
  let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
  let [time, address, latency] = fields[..] else {
    return Err(EngineError::parse(
      line_no,
      format!("expected 3 comma-separated fields, got {}", fields.len()),
    ));
  };

  let time = NaiveDateTime::parse_from_str(time, LOG_DATETIME_FORMAT)
    .map_err(|e| EngineError::parse(line_no, format!("invalid timestamp {:?}: {}", time, e)))?;

  if subnet::parse_interface(address).is_none() {
    return Err(EngineError::parse(
      line_no,
      format!("invalid interface address {:?} (expected addr/prefix)", address),
    ));
  }

  let latency = match latency {
    "-" => None,
    raw => {
      let value: i64 = raw
        .parse()
        .map_err(|e| EngineError::parse(line_no, format!("invalid latency {:?}: {}", raw, e)))?;
      if value < 0 {
        return Err(EngineError::malformed(address, format!("negative latency {}", value)));
      }
      let value = u32::try_from(value)
        .map_err(|_| EngineError::malformed(address, format!("latency {} out of range", value)))?;
      Some(value)
    }
  };

  Ok(Sample::new(time, address, latency))
}

/// Lazily read samples from a log, skipping blank lines.
pub fn read_samples<R: BufRead>(reader: R) -> impl Iterator<Item = Result<Sample, EngineError>> {
  reader
    .lines()
    .enumerate()
    .filter_map(|(idx, line)| {
      let line_no = idx + 1;
      match line {
        Ok(l) if l.trim().is_empty() => None,
        Ok(l) => Some(parse_line(&l, line_no)),
        Err(e) => Some(Err(EngineError::parse(line_no, format!("read error: {}", e)))),
      }
    })
}
