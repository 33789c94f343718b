use std::sync::Arc;
use std::time::Duration;

use tenantspec_config::{Module, TenantConfig};
use tenantspec_validator::{Problems, validate};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::SourceError;
use crate::source::Source;

/// Result of a single [`TenantStore::refresh`].
#[derive(Debug)]
pub enum RefreshOutcome {
  /// A newer config was validated and is now served.
  Updated { version: i64 },
  /// The source has nothing newer than what is served.
  Unchanged { version: i64 },
  /// The source's config failed validation; the previous one is still served.
  Rejected { version: i64, problems: Problems },
}

#[derive(Debug)]
struct Published {
  version: i64,
  config: Arc<TenantConfig>,
}

/// The validated config of one tenant, kept in sync with a [`Source`].
///
/// Readers share the config through a read lock. A refresh validates the
/// incoming config before taking the write lock, so readers never see a
/// config that has not passed validation.
pub struct TenantStore<S: Source> {
  identifier: String,
  source: S,
  current: RwLock<Option<Published>>,
}

impl<S: Source> TenantStore<S> {
  pub fn new(identifier: impl Into<String>, source: S) -> Self {
    Self {
      identifier: identifier.into(),
      source,
      current: RwLock::new(None),
    }
  }

  pub fn identifier(&self) -> &str {
    &self.identifier
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  /// The config currently served, if any has been accepted yet.
  pub async fn current(&self) -> Option<Arc<TenantConfig>> {
    self
      .current
      .read()
      .await
      .as_ref()
      .map(|p| Arc::clone(&p.config))
  }

  pub async fn version(&self) -> Option<i64> {
    self.current.read().await.as_ref().map(|p| p.version)
  }

  /// Resolve a module reference against the served config.
  ///
  /// Returns `Ok(None)` when nothing is served yet or nothing matches.
  pub async fn find_module(&self, reference: &str) -> Result<Option<Module>, SourceError> {
    let current = self.current.read().await;
    let Some(published) = current.as_ref() else {
      return Ok(None);
    };

    Ok(published.config.find_module(reference)?.cloned())
  }

  /// Fetch the tenant from the source and serve it if it is newer and valid.
  #[instrument(skip(self), fields(tenant = %self.identifier))]
  pub async fn refresh(&self) -> Result<RefreshOutcome, SourceError> {
    let overview = self.source.tenant_overview(&self.identifier).await?;
    let version = overview.version;

    if self.version().await.is_some_and(|current| version <= current) {
      debug!(version, "tenant config unchanged");
      return Ok(RefreshOutcome::Unchanged { version });
    }

    let mut config = overview
      .config
      .ok_or_else(|| SourceError::MissingConfig(self.identifier.clone()))?;

    if let Err(problems) = validate(&mut config) {
      warn!(version, problems = %problems, "rejected invalid tenant config");
      return Ok(RefreshOutcome::Rejected { version, problems });
    }

    let mut current = self.current.write().await;

    // another refresh may have won the race while we were validating
    if let Some(published) = current.as_ref()
      && version <= published.version
    {
      return Ok(RefreshOutcome::Unchanged {
        version: published.version,
      });
    }

    *current = Some(Published {
      version,
      config: Arc::new(config),
    });

    info!(version, "tenant config updated");

    Ok(RefreshOutcome::Updated { version })
  }

  /// Refresh until a config is served, retrying every `backoff`.
  ///
  /// Returns the served version, or `None` if cancelled first.
  pub async fn ready(&self, backoff: Duration, cancel: &CancellationToken) -> Option<i64> {
    loop {
      match self.refresh().await {
        Ok(_) => {
          if let Some(version) = self.version().await {
            return Some(version);
          }
        }
        Err(err) => warn!(tenant = %self.identifier, error = %err, "failed to fetch tenant config, retrying"),
      }

      tokio::select! {
        _ = cancel.cancelled() => return None,
        _ = tokio::time::sleep(backoff) => {}
      }
    }
  }

  /// Keep the served config in sync with the source until cancelled.
  ///
  /// Successful fetches are repeated every `interval`; failed fetches are
  /// retried indefinitely every `backoff`.
  pub async fn sync(&self, interval: Duration, backoff: Duration, cancel: CancellationToken) {
    info!(tenant = %self.identifier, ?interval, "tenant sync started");

    loop {
      let wait = match self.refresh().await {
        Ok(_) => interval,
        Err(err) => {
          warn!(tenant = %self.identifier, error = %err, "failed to fetch tenant config, retrying");
          backoff
        }
      };

      tokio::select! {
        _ = cancel.cancelled() => {
          info!(tenant = %self.identifier, "tenant sync cancelled");
          return;
        }
        _ = tokio::time::sleep(wait) => {}
      }
    }
  }
}
