use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// What a workflow does after a call fails.
///
/// Anything other than `continue` or `return` is kept verbatim as
/// [`Directive::Invalid`] so validation can report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Directive {
  Continue,
  Return,
  Invalid(String),
}

impl Directive {
  pub fn is_valid(&self) -> bool {
    !matches!(self, Directive::Invalid(_))
  }
}

impl From<String> for Directive {
  fn from(value: String) -> Self {
    match value.as_str() {
      "continue" => Directive::Continue,
      "return" => Directive::Return,
      _ => Directive::Invalid(value),
    }
  }
}

impl From<&str> for Directive {
  fn from(value: &str) -> Self {
    Directive::from(value.to_string())
  }
}

impl From<Directive> for String {
  fn from(directive: Directive) -> Self {
    match directive {
      Directive::Continue => "continue".to_string(),
      Directive::Return => "return".to_string(),
      Directive::Invalid(value) => value,
    }
  }
}

impl fmt::Display for Directive {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Directive::Continue => f.write_str("continue"),
      Directive::Return => f.write_str("return"),
      Directive::Invalid(value) => f.write_str(value),
    }
  }
}

/// Per-call error policy.
///
/// `code` maps observed status codes to a directive. `any` applies to every
/// failure and is only valid when `code` is empty; `other` is the fallback for
/// codes missing from a non-empty `code` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrHandler {
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub code: BTreeMap<u16, Directive>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none",
    deserialize_with = "empty_as_unset"
  )]
  pub any: Option<Directive>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none",
    deserialize_with = "empty_as_unset"
  )]
  pub other: Option<Directive>,
}

/// An empty `any` or `other` is the same as leaving it out.
fn empty_as_unset<'de, D>(deserializer: D) -> Result<Option<Directive>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<String>::deserialize(deserializer)?;
  Ok(value.filter(|v| !v.is_empty()).map(Directive::from))
}

impl ErrHandler {
  /// Decide what to do with a failure carrying `code`.
  ///
  /// Only an explicit `continue` continues; every other outcome returns.
  pub fn decide(&self, code: u16) -> Directive {
    let chosen = match self.code.get(&code) {
      Some(directive) => Some(directive),
      None if !self.code.is_empty() => self.other.as_ref(),
      None => self.any.as_ref(),
    };

    match chosen {
      Some(Directive::Continue) => Directive::Continue,
      _ => Directive::Return,
    }
  }
}
