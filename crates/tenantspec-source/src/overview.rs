use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tenantspec_config::TenantConfig;

/// The state of the entire system, used to detect that anything changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
  pub system_version: i64,
}

/// Every tenant in the system with its latest version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
  #[serde(flatten)]
  pub state: State,
  #[serde(rename = "tenantReferences")]
  pub tenant_refs: References,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct References {
  /// Tenant identifier -> latest tenant version.
  #[serde(default)]
  pub identifiers: BTreeMap<String, i64>,
}

/// One tenant's latest version and config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantOverview {
  pub identifier: String,
  pub version: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub config: Option<TenantConfig>,
}
