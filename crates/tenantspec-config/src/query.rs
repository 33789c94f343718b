use std::fmt;

use serde::{Deserialize, Serialize};

/// A named database query made available to a namespace's modules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbQuery {
  #[serde(default)]
  pub name: String,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind: Option<String>,
  #[serde(default)]
  pub var_count: i32,
  #[serde(default)]
  pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
  Insert,
  Select,
  Update,
  Delete,
}

impl QueryType {
  pub fn parse(kind: &str) -> Option<Self> {
    match kind {
      "insert" => Some(QueryType::Insert),
      "select" => Some(QueryType::Select),
      "update" => Some(QueryType::Update),
      "delete" => Some(QueryType::Delete),
      _ => None,
    }
  }
}

impl fmt::Display for QueryType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = match self {
      QueryType::Insert => "insert",
      QueryType::Select => "select",
      QueryType::Update => "update",
      QueryType::Delete => "delete",
    };
    f.write_str(kind)
  }
}

impl DbQuery {
  /// The declared query type; `None` when absent, `Some(Err(kind))` when the
  /// declared type is not recognised.
  pub fn query_type(&self) -> Option<Result<QueryType, &str>> {
    self
      .kind
      .as_deref()
      .map(|kind| QueryType::parse(kind).ok_or(kind))
  }
}
