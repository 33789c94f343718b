//! tenantspec FQMN
//!
//! A fully-qualified module name (FQMN) is the globally unique address of a
//! specific module from a specific tenant at a specific ref:
//!
//! ```text
//! fqmn://<tenant>/<namespace>/<name>@<ref>
//! fqmn://suborbital.acmeco/api-users/add-user@98qhrfgo3089hafrouhqf48
//! ```
//!
//! Namespaces can be nested (`api/users`). Two lookup forms are also
//! supported for addressing a module within the current tenant:
//!
//! ```text
//! /name/<namespace>/<name>    e.g. /name/api/users/add-user
//! /ref/<ref>                  e.g. /ref/f0e4c2f76c58916ec258f246851be
//! ```

mod error;
mod fqmn;

pub use error::{FqmnError, ParseCause};
pub use fqmn::{Fqmn, NAMESPACE_DEFAULT, from_parts};
