use tenantspec_config::ConfigError;
use tenantspec_fqmn::FqmnError;
use thiserror::Error;

/// Errors returned by a [`Source`](crate::Source) or the tenant store.
#[derive(Debug, Error)]
pub enum SourceError {
  #[error("failed to find requested tenant {0}")]
  TenantNotFound(String),

  #[error("failed to find requested namespace {namespace} in tenant {tenant}")]
  NamespaceNotFound { tenant: String, namespace: String },

  #[error("failed to find requested module {0}")]
  ModuleNotFound(String),

  /// The source knows the tenant but sent no config for it.
  #[error("tenant {0} overview has no config")]
  MissingConfig(String),

  #[error("invalid module reference: {0}")]
  Fqmn(#[from] FqmnError),

  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// The source could not be reached; callers are expected to retry.
  #[error("source unavailable: {0}")]
  Unavailable(String),
}
