use async_trait::async_trait;
use tenantspec_config::{
  Authentication, Capabilities, Connection, DbQuery, Module, NamespaceConfig, Workflow,
};
use tenantspec_fqmn::Fqmn;

use crate::error::SourceError;
use crate::overview::{Overview, State, TenantOverview};

/// How a control plane relays tenant configs to a data plane.
///
/// Implementors provide the three overview calls; the lookups built on top
/// of them have default implementations that read the tenant's config.
#[async_trait]
pub trait Source: Send + Sync {
  /// The state of the whole system, used to cheaply detect changes.
  async fn state(&self) -> Result<State, SourceError>;

  /// Every tenant and its latest version.
  async fn overview(&self) -> Result<Overview, SourceError>;

  /// The latest version and config of one tenant.
  async fn tenant_overview(&self, ident: &str) -> Result<TenantOverview, SourceError>;

  /// Find a module by its fully-qualified text-form FQMN.
  async fn module(&self, fqmn: &str) -> Result<Module, SourceError> {
    let parsed = Fqmn::parse(fqmn)?;
    if parsed.tenant.is_empty() {
      return Err(SourceError::ModuleNotFound(fqmn.to_string()));
    }

    let overview = self.tenant_overview(&parsed.tenant).await?;
    let config = overview
      .config
      .ok_or_else(|| SourceError::MissingConfig(parsed.tenant.clone()))?;

    config
      .find_module(fqmn)?
      .cloned()
      .ok_or_else(|| SourceError::ModuleNotFound(fqmn.to_string()))
  }

  /// One namespace of a tenant's latest config.
  async fn namespace(&self, ident: &str, namespace: &str) -> Result<NamespaceConfig, SourceError> {
    let overview = self.tenant_overview(ident).await?;
    let config = overview
      .config
      .ok_or_else(|| SourceError::MissingConfig(ident.to_string()))?;

    config
      .namespace(namespace)
      .cloned()
      .ok_or_else(|| SourceError::NamespaceNotFound {
        tenant: ident.to_string(),
        namespace: namespace.to_string(),
      })
  }

  async fn workflows(&self, ident: &str, namespace: &str) -> Result<Vec<Workflow>, SourceError> {
    Ok(self.namespace(ident, namespace).await?.workflows)
  }

  async fn connections(&self, ident: &str, namespace: &str) -> Result<Vec<Connection>, SourceError> {
    Ok(self.namespace(ident, namespace).await?.connections)
  }

  async fn queries(&self, ident: &str, namespace: &str) -> Result<Vec<DbQuery>, SourceError> {
    Ok(self.namespace(ident, namespace).await?.queries)
  }

  async fn capabilities(
    &self,
    ident: &str,
    namespace: &str,
  ) -> Result<Option<Capabilities>, SourceError> {
    Ok(self.namespace(ident, namespace).await?.capabilities)
  }

  async fn authentication(
    &self,
    ident: &str,
    namespace: &str,
  ) -> Result<Option<Authentication>, SourceError> {
    Ok(self.namespace(ident, namespace).await?.authentication)
  }
}
