//! Structured error types for the outage engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("malformed sample for {device}: {reason}")]
  MalformedSample { device: String, reason: String },

  #[error("invalid configuration: {field}: {reason}")]
  InvalidConfiguration { field: String, reason: String },

  #[error("parse: line {line}: {reason}")]
  Parse { line: usize, reason: String },

  #[error("config: {0}")]
  Config(#[from] toml::de::Error),
}

impl EngineError {
  pub fn malformed(device: &str, reason: impl Into<String>) -> Self {
    Self::MalformedSample {
      device: device.to_string(),
      reason: reason.into(),
    }
  }

  pub fn invalid_config(field: &str, reason: impl Into<String>) -> Self {
    Self::InvalidConfiguration {
      field: field.to_string(),
      reason: reason.into(),
    }
  }

  pub fn parse(line: usize, reason: impl Into<String>) -> Self {
    Self::Parse {
      line,
      reason: reason.into(),
    }
  }
}
