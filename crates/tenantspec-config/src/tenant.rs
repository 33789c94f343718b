use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tenantspec_fqmn::{Fqmn, FqmnError, NAMESPACE_DEFAULT, from_parts};

use crate::connection::Connection;
use crate::error::ConfigError;
use crate::module::Module;
use crate::query::DbQuery;
use crate::workflow::Workflow;

/// Header type used when an authentication rule does not name one.
pub const DEFAULT_HEADER_TYPE: &str = "bearer";

/// Capability configuration of a namespace, passed through untouched.
pub type Capabilities = serde_json::Value;

/// A tenant and everything it declares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TenantConfig {
  /// Reverse-domain identifier, e.g. `dev.example.app`.
  pub identifier: String,
  pub spec_version: i32,
  /// Bumped on every published change.
  pub tenant_version: i64,
  pub default_namespace: NamespaceConfig,
  pub namespaces: Vec<NamespaceConfig>,
  /// Union of every namespace's modules.
  pub modules: Vec<Module>,
}

/// A named partition of a tenant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NamespaceConfig {
  pub name: String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub workflows: Vec<Workflow>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub queries: Vec<DbQuery>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub capabilities: Option<Capabilities>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub connections: Vec<Connection>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub authentication: Option<Authentication>,
  /// Filled in by packaging tools, never by users.
  pub modules: Vec<Module>,
}

/// Per-domain auth header rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Authentication {
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub domains: BTreeMap<String, AuthHeader>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthHeader {
  #[serde(default)]
  pub header_type: String,
  #[serde(default)]
  pub value: String,
}

/// Encoding of a tenant config on disk or on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
  Json,
  Yaml,
}

impl Format {
  /// Pick the format from a file extension, defaulting to JSON.
  pub fn from_path(path: &Path) -> Self {
    match path.extension().and_then(|e| e.to_str()) {
      Some("yaml" | "yml") => Format::Yaml,
      _ => Format::Json,
    }
  }
}

impl NamespaceConfig {
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Default::default()
    }
  }
}

impl TenantConfig {
  pub fn new(identifier: impl Into<String>) -> Self {
    Self {
      identifier: identifier.into(),
      ..Default::default()
    }
  }

  /// Compute the address of every module that does not have one yet.
  ///
  /// Modules without a namespace are moved into the default namespace. A
  /// module that cannot be addressed (e.g. it has no ref) is left without an
  /// address; it will fail resolution wherever it is referenced.
  pub fn backfill_addresses(&mut self) {
    let identifier = &self.identifier;

    for module in self.modules.iter_mut().filter(|m| m.fqmn.is_none()) {
      if module.namespace.is_empty() {
        module.namespace = NAMESPACE_DEFAULT.to_string();
      }

      module.fqmn = from_parts(
        identifier,
        &module.namespace,
        &module.name,
        &module.reference,
      )
      .ok();
    }
  }

  /// The address a module with these parts would have in this tenant.
  pub fn fqmn_for(&self, namespace: &str, name: &str, reference: &str) -> Result<String, FqmnError> {
    from_parts(&self.identifier, namespace, name, reference)
  }

  /// The default namespace followed by every additional namespace.
  pub fn namespaces(&self) -> impl Iterator<Item = &NamespaceConfig> {
    std::iter::once(&self.default_namespace).chain(self.namespaces.iter())
  }

  /// Look up a namespace by name; `default` always names the default namespace.
  pub fn namespace(&self, name: &str) -> Option<&NamespaceConfig> {
    if name == NAMESPACE_DEFAULT || name == self.default_namespace.name {
      return Some(&self.default_namespace);
    }

    self.namespaces.iter().find(|ns| ns.name == name)
  }

  pub fn module_table(&self) -> ModuleTable<'_> {
    ModuleTable::new(&self.identifier, &self.modules)
  }

  /// Resolve a module reference against this tenant's modules.
  ///
  /// References to another tenant resolve to `Ok(None)`.
  pub fn find_module(&self, reference: &str) -> Result<Option<&Module>, FqmnError> {
    self.module_table().find(reference)
  }

  /// Backfill addresses, then encode as JSON.
  pub fn marshal(&mut self) -> Result<Vec<u8>, ConfigError> {
    self.encode(Format::Json)
  }

  /// Decode JSON, then backfill addresses. Does not validate.
  pub fn unmarshal(bytes: &[u8]) -> Result<Self, ConfigError> {
    Self::decode(bytes, Format::Json)
  }

  pub fn from_yaml(bytes: &[u8]) -> Result<Self, ConfigError> {
    Self::decode(bytes, Format::Yaml)
  }

  pub fn to_yaml(&mut self) -> Result<String, ConfigError> {
    self.backfill_addresses();
    Ok(serde_yaml::to_string(self)?)
  }

  /// Read a tenant file, choosing the format from its extension.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    Self::decode(&bytes, Format::from_path(path))
  }

  pub fn encode(&mut self, format: Format) -> Result<Vec<u8>, ConfigError> {
    self.backfill_addresses();

    let bytes = match format {
      Format::Json => serde_json::to_vec(self)?,
      Format::Yaml => serde_yaml::to_string(self)?.into_bytes(),
    };

    Ok(bytes)
  }

  pub fn decode(bytes: &[u8], format: Format) -> Result<Self, ConfigError> {
    let mut config: TenantConfig = match format {
      Format::Json => serde_json::from_slice(bytes)?,
      Format::Yaml => serde_yaml::from_slice(bytes)?,
    };

    config.backfill_addresses();

    Ok(config)
  }
}

/// A read-only view of a tenant's modules used to resolve references.
#[derive(Debug, Clone, Copy)]
pub struct ModuleTable<'a> {
  identifier: &'a str,
  modules: &'a [Module],
}

impl<'a> ModuleTable<'a> {
  pub fn new(identifier: &'a str, modules: &'a [Module]) -> Self {
    Self {
      identifier,
      modules,
    }
  }

  pub fn identifier(&self) -> &'a str {
    self.identifier
  }

  /// Resolve a reference in any supported form.
  ///
  /// A reference that does not parse is an error; one that parses but names
  /// another tenant or no declared module is `Ok(None)`.
  pub fn find(&self, reference: &str) -> Result<Option<&'a Module>, FqmnError> {
    let fqmn = Fqmn::parse_reference(reference)?;

    if !fqmn.tenant.is_empty() && fqmn.tenant != self.identifier {
      return Ok(None);
    }

    let found = if fqmn.name.is_empty() {
      self
        .modules
        .iter()
        .find(|m| m.matches_ref(&fqmn.reference))
    } else {
      self.modules.iter().find(|m| {
        m.name == fqmn.name
          && m.namespace == fqmn.namespace
          && (fqmn.reference.is_empty() || m.matches_ref(&fqmn.reference))
      })
    };

    Ok(found)
  }
}
