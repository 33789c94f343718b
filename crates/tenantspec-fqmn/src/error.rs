use std::fmt;

use thiserror::Error;

/// The specific reason an FQMN failed to parse.
///
/// Callers should branch on the cause rather than on the rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseCause {
  /// The string starts with none of `fqmn://`, `/name/` or `/ref/`.
  WrongPrefix,
  /// The text form has fewer than three segments after the scheme.
  NotFullyQualified,
  /// The name-lookup form has fewer than two segments.
  TooFewParts,
  /// The ref-lookup form has more than one segment.
  MalformedRef,
  /// The last segment is empty.
  TrailingSlash,
}

impl fmt::Display for ParseCause {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let message = match self {
      ParseCause::WrongPrefix => "FQMN must begin with 'fqmn://', '/name/', or '/ref/'",
      ParseCause::NotFullyQualified => {
        "FQMN text format must contain a tenant, namespace, and module name"
      }
      ParseCause::TooFewParts => "FQMN must contain a namespace and module name",
      ParseCause::MalformedRef => "'/ref/' format may only contain one reference",
      ParseCause::TrailingSlash => "FQMN must not end in a trailing slash",
    };

    f.write_str(message)
  }
}

/// Errors produced by the address grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FqmnError {
  /// The input could not be parsed as any supported surface form.
  #[error("FQMN failed to parse {input:?}: {cause}")]
  Parse { input: String, cause: ParseCause },

  /// One of the parts passed to `from_parts` was empty.
  #[error("all FQMN parts (tenant, namespace, name, ref) must be defined")]
  Construction,
}

impl FqmnError {
  pub(crate) fn parse(input: &str, cause: ParseCause) -> Self {
    FqmnError::Parse {
      input: input.to_string(),
      cause,
    }
  }

  /// The parse cause, if this is a parse failure.
  pub fn cause(&self) -> Option<ParseCause> {
    match self {
      FqmnError::Parse { cause, .. } => Some(*cause),
      FqmnError::Construction => None,
    }
  }
}
