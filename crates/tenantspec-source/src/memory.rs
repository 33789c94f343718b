use std::collections::BTreeMap;

use async_trait::async_trait;
use tenantspec_config::TenantConfig;
use tokio::sync::RwLock;

use crate::error::SourceError;
use crate::overview::{Overview, References, State, TenantOverview};
use crate::source::Source;

/// In-memory source, e.g. for embedding a control plane in tests.
///
/// Every publish or removal bumps the system version.
#[derive(Debug, Default)]
pub struct StaticSource {
  inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
  system_version: i64,
  tenants: BTreeMap<String, TenantConfig>,
}

impl StaticSource {
  pub fn new() -> Self {
    Self::default()
  }

  /// Publish a tenant config, replacing any previous config for the tenant.
  pub async fn publish(&self, config: TenantConfig) {
    let mut inner = self.inner.write().await;
    inner.system_version += 1;
    inner.tenants.insert(config.identifier.clone(), config);
  }

  /// Remove a tenant; returns whether it existed.
  pub async fn remove(&self, ident: &str) -> bool {
    let mut inner = self.inner.write().await;
    let removed = inner.tenants.remove(ident).is_some();
    if removed {
      inner.system_version += 1;
    }
    removed
  }
}

#[async_trait]
impl Source for StaticSource {
  async fn state(&self) -> Result<State, SourceError> {
    let inner = self.inner.read().await;
    Ok(State {
      system_version: inner.system_version,
    })
  }

  async fn overview(&self) -> Result<Overview, SourceError> {
    let inner = self.inner.read().await;
    Ok(Overview {
      state: State {
        system_version: inner.system_version,
      },
      tenant_refs: References {
        identifiers: inner
          .tenants
          .iter()
          .map(|(ident, config)| (ident.clone(), config.tenant_version))
          .collect(),
      },
    })
  }

  async fn tenant_overview(&self, ident: &str) -> Result<TenantOverview, SourceError> {
    let inner = self.inner.read().await;
    let config = inner
      .tenants
      .get(ident)
      .ok_or_else(|| SourceError::TenantNotFound(ident.to_string()))?;

    Ok(TenantOverview {
      identifier: ident.to_string(),
      version: config.tenant_version,
      config: Some(config.clone()),
    })
  }
}

#[cfg(test)]
mod tests {
  use tenantspec_config::{DbQuery, Module, NamespaceConfig};

  use super::*;

  fn tenant(version: i64) -> TenantConfig {
    let mut config = TenantConfig::new("dev.example.app");
    config.tenant_version = version;
    config.modules.push(Module::new("getUser", "db", "v1"));
    let mut db = NamespaceConfig::named("db");
    db.queries.push(DbQuery {
      name: "getUser".to_string(),
      kind: Some("select".to_string()),
      var_count: 1,
      query: "SELECT * FROM users WHERE id = $1".to_string(),
    });
    db.capabilities = Some(serde_json::json!({"cache": {"enabled": true}}));
    config.namespaces.push(db);
    config.backfill_addresses();
    config
  }

  #[tokio::test]
  async fn test_publish_bumps_versions() {
    let source = StaticSource::new();
    assert_eq!(source.state().await.unwrap().system_version, 0);

    source.publish(tenant(1)).await;
    source.publish(tenant(2)).await;

    let overview = source.overview().await.unwrap();
    assert_eq!(overview.state.system_version, 2);
    assert_eq!(overview.tenant_refs.identifiers["dev.example.app"], 2);

    assert!(source.remove("dev.example.app").await);
    assert!(!source.remove("dev.example.app").await);
    assert_eq!(source.state().await.unwrap().system_version, 3);
  }

  #[tokio::test]
  async fn test_default_lookups() {
    let source = StaticSource::new();
    source.publish(tenant(1)).await;

    let module = source
      .module("fqmn://dev.example.app/db/getUser@v1")
      .await
      .unwrap();
    assert_eq!(module.name, "getUser");

    assert!(matches!(
      source.module("fqmn://dev.example.app/db/getUser@v2").await,
      Err(SourceError::ModuleNotFound(_))
    ));
    assert!(matches!(
      source.module("/name/db/getUser").await,
      Err(SourceError::ModuleNotFound(_))
    ));
    assert!(matches!(
      source.module("fqmn://com.other/db/getUser@v1").await,
      Err(SourceError::TenantNotFound(t)) if t == "com.other"
    ));

    assert!(source.workflows("dev.example.app", "db").await.unwrap().is_empty());
    assert!(source.authentication("dev.example.app", "default").await.unwrap().is_none());

    let queries = source.queries("dev.example.app", "db").await.unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].name, "getUser");
    assert!(source.queries("dev.example.app", "default").await.unwrap().is_empty());

    let capabilities = source.capabilities("dev.example.app", "db").await.unwrap();
    assert_eq!(capabilities.unwrap()["cache"]["enabled"], true);
    assert!(source.capabilities("dev.example.app", "default").await.unwrap().is_none());
    assert!(matches!(
      source.connections("dev.example.app", "missing").await,
      Err(SourceError::NamespaceNotFound { .. })
    ));
  }
}
