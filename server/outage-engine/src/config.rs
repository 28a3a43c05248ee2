//! Analysis configuration: debounce tolerances and the overload threshold.

use serde::Deserialize;

use crate::error::EngineError;

/// Tunable thresholds for incident detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Consecutive timeouts needed before a failure run is reported. 0 and 1 both report immediately.
  pub failure_tolerance: u32,
  /// Consecutive over-threshold samples needed before an overload run is reported.
  pub overload_tolerance: u32,
  /// Latency strictly above which a sample counts as overloaded. `None` disables overload detection.
  pub overload_threshold: Option<u32>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      failure_tolerance: 1,
      overload_tolerance: 1,
      overload_threshold: None,
    }
  }
}

/// Unvalidated configuration as it arrives from a TOML file or the command line.
///
/// Fields are signed so that a negative value can be reported instead of
/// failing somewhere inside the decoder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
  pub failure_tolerance: Option<i64>,
  pub overload_tolerance: Option<i64>,
  pub overload_threshold: Option<i64>,
}

impl RawConfig {
  pub fn from_toml_str(s: &str) -> Result<Self, EngineError> {
    Ok(toml::from_str(s)?)
  }

  /// Fields set in `other` win over fields set in `self`.
  pub fn merge(self, other: RawConfig) -> RawConfig {
    RawConfig {
      failure_tolerance: other.failure_tolerance.or(self.failure_tolerance),
      overload_tolerance: other.overload_tolerance.or(self.overload_tolerance),
      overload_threshold: other.overload_threshold.or(self.overload_threshold),
    }
  }
}

fn non_negative(field: &str, value: i64) -> Result<u32, EngineError> {
  if value < 0 {
    return Err(EngineError::invalid_config(field, format!("must not be negative (got {})", value)));
  }
  u32::try_from(value).map_err(|_| EngineError::invalid_config(field, format!("too large (got {})", value)))
}

impl TryFrom<RawConfig> for Config {
  type Error = EngineError;

  fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
    let defaults = Config::default();
    let failure_tolerance = match raw.failure_tolerance {
      Some(v) => non_negative("failure_tolerance", v)?,
      None => defaults.failure_tolerance,
    };
    let overload_tolerance = match raw.overload_tolerance {
      Some(v) => non_negative("overload_tolerance", v)?,
      None => defaults.overload_tolerance,
    };
    let overload_threshold = raw
      .overload_threshold
      .map(|v| non_negative("overload_threshold", v))
      .transpose()?;

    Ok(Config {
      failure_tolerance,
      overload_tolerance,
      overload_threshold,
    })
  }
}

impl Config {
  /// Effective tolerance: a run always has at least one sample, so 0 behaves like 1.
  pub fn effective(tolerance: u32) -> u32 {
    tolerance.max(1)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_toml_gives_defaults() {
    let raw = RawConfig::from_toml_str("").unwrap();
    let config = Config::try_from(raw).unwrap();
    assert_eq!(config, Config::default());
  }

  #[test]
  fn toml_values_are_applied() {
    let raw = RawConfig::from_toml_str(
      "failure_tolerance = 3\noverload_tolerance = 2\noverload_threshold = 50\n",
    )
    .unwrap();
    let config = Config::try_from(raw).unwrap();
    assert_eq!(config.failure_tolerance, 3);
    assert_eq!(config.overload_tolerance, 2);
    assert_eq!(config.overload_threshold, Some(50));
  }

  #[test]
  fn negative_tolerance_is_rejected() {
    let raw = RawConfig {
      failure_tolerance: Some(-1),
      ..RawConfig::default()
    };
    let err = Config::try_from(raw).unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfiguration { ref field, .. } if field == "failure_tolerance"));
  }

  #[test]
  fn negative_threshold_is_rejected() {
    let raw = RawConfig {
      overload_threshold: Some(-5),
      ..RawConfig::default()
    };
    let err = Config::try_from(raw).unwrap_err();
    assert!(err.to_string().contains("overload_threshold"));
  }

  #[test]
  fn largest_threshold_is_accepted() {
    let raw = RawConfig {
      overload_threshold: Some(i64::from(u32::MAX)),
      ..RawConfig::default()
    };
    let config = Config::try_from(raw).unwrap();
    assert_eq!(config.overload_threshold, Some(u32::MAX));
  }

  #[test]
  fn later_layer_overrides_earlier() {
    let file = RawConfig {
      failure_tolerance: Some(2),
      overload_threshold: Some(80),
      ..RawConfig::default()
    };
    let flags = RawConfig {
      failure_tolerance: Some(4),
      ..RawConfig::default()
    };
    let merged = file.merge(flags);
    assert_eq!(merged.failure_tolerance, Some(4));
    assert_eq!(merged.overload_threshold, Some(80));
  }

  #[test]
  fn bad_toml_is_a_config_error() {
    let err = RawConfig::from_toml_str("failure_tolerance = \"lots\"").unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
  }

  #[test]
  fn zero_tolerance_is_immediate() {
    assert_eq!(Config::effective(0), 1);
    assert_eq!(Config::effective(3), 3);
  }
}
