use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FqmnError, ParseCause};

/// The namespace that modules live in when none is given.
pub const NAMESPACE_DEFAULT: &str = "default";

const TEXT_PREFIX: &str = "fqmn://";
const NAME_PREFIX: &str = "/name/";
const REF_PREFIX: &str = "/ref/";

/// A parsed fully-qualified module name.
///
/// Which fields are populated depends on the surface form it was parsed from:
/// the text form fills `tenant`, `namespace`, `name` and optionally `ref`, the
/// name-lookup form fills `namespace` and `name`, and the ref-lookup form fills
/// only `ref`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fqmn {
  pub tenant: String,
  pub namespace: String,
  pub name: String,
  #[serde(rename = "ref")]
  pub reference: String,
}

impl Fqmn {
  /// Parse one of the three URI surface forms.
  pub fn parse(input: &str) -> Result<Self, FqmnError> {
    let known_prefix = [TEXT_PREFIX, NAME_PREFIX, REF_PREFIX]
      .iter()
      .any(|prefix| input.starts_with(prefix));

    if known_prefix && input.ends_with('/') {
      return Err(FqmnError::parse(input, ParseCause::TrailingSlash));
    }

    if let Some(rest) = input.strip_prefix(TEXT_PREFIX) {
      return Self::parse_text(input, rest);
    }

    if let Some(rest) = input.strip_prefix(NAME_PREFIX) {
      return Self::parse_name_uri(input, rest);
    }

    if let Some(rest) = input.strip_prefix(REF_PREFIX) {
      return Self::parse_ref_uri(input, rest);
    }

    Err(FqmnError::parse(input, ParseCause::WrongPrefix))
  }

  /// Parse a module reference as written in a workflow step.
  ///
  /// Anything that looks like a URI goes through [`Fqmn::parse`]. Everything
  /// else is a short `[tenant#][namespace::]name` reference and is read with
  /// [`Fqmn::migrate_v1`], so a bare name lands in the default namespace.
  pub fn parse_reference(reference: &str) -> Result<Self, FqmnError> {
    if reference.starts_with('/') || reference.contains("://") {
      return Self::parse(reference);
    }

    Ok(Self::migrate_v1(reference, ""))
  }

  /// Map the legacy `tenant#namespace::name@version` notation onto the
  /// structured form. The legacy version is discarded in favour of `reference`.
  pub fn migrate_v1(legacy: &str, reference: &str) -> Self {
    let (tenant, rest) = match legacy.split_once('#') {
      Some((tenant, rest)) => (tenant, rest),
      None => ("", legacy),
    };

    let (namespace, rest) = match rest.split_once("::") {
      Some((namespace, rest)) => (namespace, rest),
      None => (NAMESPACE_DEFAULT, rest),
    };

    let name = match rest.split_once('@') {
      Some((name, _version)) => name,
      None => rest,
    };

    Fqmn {
      tenant: tenant.to_string(),
      namespace: namespace.to_string(),
      name: name.to_string(),
      reference: reference.to_string(),
    }
  }

  /// The URL path used by the wire layer: `/<tenant>/<ref>/<namespace>/<name>`.
  pub fn url_path(&self) -> String {
    format!(
      "/{}/{}/{}/{}",
      self.tenant, self.reference, self.namespace, self.name
    )
  }

  fn parse_text(input: &str, rest: &str) -> Result<Self, FqmnError> {
    let (path, reference) = match rest.split_once('@') {
      Some((path, reference)) => (path, reference),
      None => (rest, ""),
    };

    // tenant, at least one namespace segment, and the module name
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 3 {
      return Err(FqmnError::parse(input, ParseCause::NotFullyQualified));
    }

    let last = segments.len() - 1;
    if segments[last].is_empty() {
      return Err(FqmnError::parse(input, ParseCause::TrailingSlash));
    }

    Ok(Fqmn {
      tenant: segments[0].to_string(),
      namespace: segments[1..last].join("/"),
      name: segments[last].to_string(),
      reference: reference.to_string(),
    })
  }

  fn parse_name_uri(input: &str, rest: &str) -> Result<Self, FqmnError> {
    let segments: Vec<&str> = rest.split('/').collect();
    if segments.len() < 2 {
      return Err(FqmnError::parse(input, ParseCause::TooFewParts));
    }

    let last = segments.len() - 1;

    Ok(Fqmn {
      namespace: segments[..last].join("/"),
      name: segments[last].to_string(),
      ..Default::default()
    })
  }

  fn parse_ref_uri(input: &str, rest: &str) -> Result<Self, FqmnError> {
    if rest.contains('/') {
      return Err(FqmnError::parse(input, ParseCause::MalformedRef));
    }

    Ok(Fqmn {
      reference: rest.to_string(),
      ..Default::default()
    })
  }
}

impl fmt::Display for Fqmn {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if !self.tenant.is_empty() {
      write!(
        f,
        "{}{}/{}/{}",
        TEXT_PREFIX, self.tenant, self.namespace, self.name
      )?;
      if !self.reference.is_empty() {
        write!(f, "@{}", self.reference)?;
      }
      return Ok(());
    }

    if !self.name.is_empty() {
      return write!(f, "{}{}/{}", NAME_PREFIX, self.namespace, self.name);
    }

    write!(f, "{}{}", REF_PREFIX, self.reference)
  }
}

/// Render the canonical text form `fqmn://tenant/namespace/name@ref`.
///
/// Every part is required.
pub fn from_parts(
  tenant: &str,
  namespace: &str,
  name: &str,
  reference: &str,
) -> Result<String, FqmnError> {
  if tenant.is_empty() || namespace.is_empty() || name.is_empty() || reference.is_empty() {
    return Err(FqmnError::Construction);
  }

  Ok(format!(
    "{}{}/{}/{}@{}",
    TEXT_PREFIX, tenant, namespace, name, reference
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  const REF: &str = "98qhrfgo3089hafrouhqf48";

  fn text(tenant: &str, namespace: &str, name: &str, reference: &str) -> Fqmn {
    Fqmn {
      tenant: tenant.to_string(),
      namespace: namespace.to_string(),
      name: name.to_string(),
      reference: reference.to_string(),
    }
  }

  #[test]
  fn test_parse_valid_forms() {
    let cases = [
      (
        "fqmn://suborbital.acmeco/api-users/add-user",
        text("suborbital.acmeco", "api-users", "add-user", ""),
      ),
      (
        "fqmn://suborbital.acmeco/api/users/add-user",
        text("suborbital.acmeco", "api/users", "add-user", ""),
      ),
      (
        "fqmn://suborbital.acmeco/api/users/auora/add-user",
        text("suborbital.acmeco", "api/users/auora", "add-user", ""),
      ),
      (
        "fqmn://suborbital.acmeco/api-users/add-user@98qhrfgo3089hafrouhqf48",
        text("suborbital.acmeco", "api-users", "add-user", REF),
      ),
      (
        "fqmn://suborbital.acmeco/api/users/auora/add-user@98qhrfgo3089hafrouhqf48",
        text("suborbital.acmeco", "api/users/auora", "add-user", REF),
      ),
      ("/name/api-users/add-user", text("", "api-users", "add-user", "")),
      ("/name/api/users/add-user", text("", "api/users", "add-user", "")),
      (
        "/name/api/users/auora/add-user",
        text("", "api/users/auora", "add-user", ""),
      ),
      ("/ref/98qhrfgo3089hafrouhqf48", text("", "", "", REF)),
    ];

    for (input, expected) in cases {
      assert_eq!(Fqmn::parse(input).unwrap(), expected, "parsing {input}");
    }
  }

  #[test]
  fn test_parse_failure_causes() {
    let cases = [
      (
        "fqmn:suborbital.acmeco/api/users/add-user@98qhrfgo3089hafrouhqf48",
        ParseCause::WrongPrefix,
      ),
      (
        "https://suborbital.acmeco/api/users/add-user",
        ParseCause::WrongPrefix,
      ),
      ("/module/api/users/auora/add-user", ParseCause::WrongPrefix),
      ("/reference/98qhrfgo3089hafrouhqf48", ParseCause::WrongPrefix),
      (
        "fqmn://suborbital.acmeco@98qhrfgo3089hafrouhqf48",
        ParseCause::NotFullyQualified,
      ),
      (
        "fqmn://suborbital.acmeco/add-user@98qhrfgo3089hafrouhqf48",
        ParseCause::NotFullyQualified,
      ),
      ("/name/add-user", ParseCause::TooFewParts),
      ("/name/suborbital.acmeco", ParseCause::TooFewParts),
      ("/ref/98qhrfgo3089hafrouhqf48/add-user", ParseCause::MalformedRef),
      (
        "/ref/98qhrfgo3089hafrouhqf48/suborbital.acmeco/add-user",
        ParseCause::MalformedRef,
      ),
      (
        "fqmn://suborbital.acmeco/98qhrfgo3089hafrouhqf48/api/users/add-user/",
        ParseCause::TrailingSlash,
      ),
      ("/ref/98qhrfgo3089hafrouhqf48/", ParseCause::TrailingSlash),
    ];

    for (input, cause) in cases {
      let err = Fqmn::parse(input).unwrap_err();
      assert_eq!(err.cause(), Some(cause), "parsing {input}");
    }
  }

  #[test]
  fn test_trailing_slash_for_every_form() {
    for input in [
      "fqmn://acmeco/",
      "fqmn://acmeco/api/",
      "fqmn://acmeco/api/users/add-user@abc/",
      "/name/",
      "/name/api/",
      "/name/api/users/",
      "/ref/",
      "/ref/abc/",
    ] {
      let err = Fqmn::parse(input).unwrap_err();
      assert_eq!(
        err.cause(),
        Some(ParseCause::TrailingSlash),
        "parsing {input}"
      );
    }
  }

  #[test]
  fn test_from_parts() {
    let fqmn = from_parts("com.suborbital.something", "default", "foobar", "asdf").unwrap();
    assert_eq!(fqmn, "fqmn://com.suborbital.something/default/foobar@asdf");
  }

  #[test]
  fn test_from_parts_requires_every_part() {
    let parts = ["com.suborbital.something", "default", "foobar", "asdf"];

    for missing in 0..parts.len() {
      let mut input = parts;
      input[missing] = "";
      let result = from_parts(input[0], input[1], input[2], input[3]);
      assert_eq!(result, Err(FqmnError::Construction));
    }
  }

  #[test]
  fn test_parse_recovers_from_parts() {
    let cases = [
      ("dev.example.app", "default", "getUser", "v1"),
      ("dev.example.app", "db", "get-user", "98qhrfgo3089"),
      ("suborbital.acmeco", "api/users/auora", "add-user", REF),
    ];

    for (tenant, namespace, name, reference) in cases {
      let rendered = from_parts(tenant, namespace, name, reference).unwrap();
      let parsed = Fqmn::parse(&rendered).unwrap();
      assert_eq!(parsed, text(tenant, namespace, name, reference));
      assert_eq!(parsed.to_string(), rendered);
    }
  }

  #[test]
  fn test_migrate_v1() {
    let fqmn = Fqmn::migrate_v1("suborbital.test#default::get-file@v0.0.1", REF);
    assert_eq!(fqmn, text("suborbital.test", "default", "get-file", REF));
  }

  #[test]
  fn test_migrate_v1_defaults_namespace() {
    let fqmn = Fqmn::migrate_v1("get-file", "");
    assert_eq!(fqmn, text("", NAMESPACE_DEFAULT, "get-file", ""));

    let fqmn = Fqmn::migrate_v1("db::getUser@v2", "abc");
    assert_eq!(fqmn, text("", "db", "getUser", "abc"));
  }

  #[test]
  fn test_parse_reference_short_and_uri_forms() {
    assert_eq!(
      Fqmn::parse_reference("db::getUser").unwrap(),
      text("", "db", "getUser", "")
    );
    assert_eq!(
      Fqmn::parse_reference("getUser").unwrap(),
      text("", "default", "getUser", "")
    );
    assert_eq!(
      Fqmn::parse_reference("/name/db/getUser").unwrap(),
      text("", "db", "getUser", "")
    );

    let err = Fqmn::parse_reference("/module/db/getUser").unwrap_err();
    assert_eq!(err.cause(), Some(ParseCause::WrongPrefix));
  }

  #[test]
  fn test_display_forms() {
    assert_eq!(
      Fqmn::parse("/name/api/users/add-user").unwrap().to_string(),
      "/name/api/users/add-user"
    );
    assert_eq!(Fqmn::parse("/ref/abc").unwrap().to_string(), "/ref/abc");
    assert_eq!(
      Fqmn::parse("fqmn://acmeco/api/add-user").unwrap().to_string(),
      "fqmn://acmeco/api/add-user"
    );
  }

  #[test]
  fn test_url_path() {
    let fqmn = Fqmn::parse("fqmn://acmeco/api/users/add-user@abc").unwrap();
    assert_eq!(fqmn.url_path(), "/acmeco/abc/api/users/add-user");
  }

  #[test]
  fn test_serializes_ref_field() {
    let fqmn = text("acmeco", "api", "add-user", "abc");
    let value = serde_json::to_value(&fqmn).unwrap();
    assert_eq!(value["ref"], "abc");
  }
}
