use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tenantspec_config::{Format, TenantConfig};
use tokio::fs;
use tracing::debug;

use crate::error::SourceError;
use crate::overview::{Overview, References, State, TenantOverview};
use crate::source::Source;

const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Directory-backed source.
///
/// Each tenant is one file named after its identifier:
/// ```text
/// {root}/
/// ├── dev.example.app.yaml
/// └── com.acme.billing.json
/// ```
///
/// Files are re-read on every call. The system version is the sum of all
/// tenant versions, so it grows whenever a tenant is published or added.
pub struct FileSource {
  root: PathBuf,
}

impl FileSource {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// The first existing tenant file for `ident`.
  async fn tenant_path(&self, ident: &str) -> Result<Option<PathBuf>, SourceError> {
    for ext in EXTENSIONS {
      let path = self.root.join(format!("{ident}.{ext}"));
      if fs::try_exists(&path).await? {
        return Ok(Some(path));
      }
    }
    Ok(None)
  }

  async fn read_tenant(&self, path: &Path) -> Result<TenantConfig, SourceError> {
    let bytes = fs::read(path).await?;
    let config = TenantConfig::decode(&bytes, Format::from_path(path))?;
    Ok(config)
  }

  /// Every tenant config under the root. Unreadable files are skipped.
  async fn tenants(&self) -> Result<Vec<TenantConfig>, SourceError> {
    let mut tenants = Vec::new();

    if !fs::try_exists(&self.root).await? {
      return Ok(tenants);
    }

    let mut entries = fs::read_dir(&self.root).await?;
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      let is_tenant_file = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| EXTENSIONS.contains(&e));

      if !is_tenant_file {
        continue;
      }

      match self.read_tenant(&path).await {
        Ok(config) => tenants.push(config),
        Err(err) => debug!(path = %path.display(), error = %err, "skipping unreadable tenant file"),
      }
    }

    Ok(tenants)
  }
}

#[async_trait]
impl Source for FileSource {
  async fn state(&self) -> Result<State, SourceError> {
    Ok(self.overview().await?.state)
  }

  async fn overview(&self) -> Result<Overview, SourceError> {
    let tenants = self.tenants().await?;

    let identifiers = tenants
      .into_iter()
      .map(|config| (config.identifier, config.tenant_version))
      .collect::<std::collections::BTreeMap<_, _>>();

    Ok(Overview {
      state: State {
        system_version: identifiers.values().sum(),
      },
      tenant_refs: References { identifiers },
    })
  }

  async fn tenant_overview(&self, ident: &str) -> Result<TenantOverview, SourceError> {
    let path = self
      .tenant_path(ident)
      .await?
      .ok_or_else(|| SourceError::TenantNotFound(ident.to_string()))?;

    let config = self.read_tenant(&path).await?;
    if config.identifier != ident {
      return Err(SourceError::TenantNotFound(ident.to_string()));
    }

    Ok(TenantOverview {
      identifier: ident.to_string(),
      version: config.tenant_version,
      config: Some(config),
    })
  }
}
