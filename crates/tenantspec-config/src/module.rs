use serde::{Deserialize, Serialize};

/// A deployable module declared by a tenant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub namespace: String,
  /// Source language tag, opaque to tenantspec.
  #[serde(default)]
  pub lang: String,
  /// Content or version reference of the current revision.
  #[serde(rename = "ref", default)]
  pub reference: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub draft_ref: Option<String>,
  /// Version of the API / SDK the module was built with.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub api_version: Option<String>,
  /// Computed during address backfill, never written by users.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fqmn: Option<String>,
  #[serde(default)]
  pub revisions: Vec<ModuleRevision>,
}

/// A historical revision of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRevision {
  #[serde(rename = "ref")]
  pub reference: String,
}

impl Module {
  pub fn new(
    name: impl Into<String>,
    namespace: impl Into<String>,
    reference: impl Into<String>,
  ) -> Self {
    Self {
      name: name.into(),
      namespace: namespace.into(),
      reference: reference.into(),
      ..Default::default()
    }
  }

  /// Whether `reference` names the current or draft revision of this module.
  pub fn matches_ref(&self, reference: &str) -> bool {
    if reference.is_empty() {
      return false;
    }

    self.reference == reference || self.draft_ref.as_deref() == Some(reference)
  }
}
