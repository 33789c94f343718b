use std::path::PathBuf;

use thiserror::Error;

/// Errors from encoding or decoding a tenant config.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid JSON tenant config: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid YAML tenant config: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("failed to read {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Errors from interpreting a connection's settings.
#[derive(Debug, Error)]
pub enum ConnectionError {
  #[error("unknown connection type {0:?}")]
  UnknownType(String),

  #[error("{0} is empty")]
  MissingField(&'static str),

  #[error("malformed connection settings: {0}")]
  Malformed(#[from] serde_json::Error),
}
