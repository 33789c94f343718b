use std::fmt;

use tenantspec_config::Route;
use tenantspec_fqmn::FqmnError;
use thiserror::Error;

/// Where in a tenant a step-level problem was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLocation {
  pub namespace: String,
  pub workflow: String,
  /// Zero-based position of the step in its workflow.
  pub step: usize,
}

impl fmt::Display for StepLocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "workflow {}::{} step {}",
      self.namespace, self.workflow, self.step
    )
  }
}

/// A single defect found while validating a tenant config.
#[derive(Debug, Error)]
pub enum Problem {
  #[error("identifier is missing")]
  MissingIdentifier,

  #[error("no modules listed")]
  NoModules,

  /// Two modules share `namespace::name`, or a default-namespace module
  /// collides with another module under its bare name.
  #[error("duplicate module {key} found")]
  DuplicateModule { key: String },

  #[error("module at position {index} missing name")]
  ModuleMissingName { index: usize },

  #[error("module at position {index} missing namespace")]
  ModuleMissingNamespace { index: usize },

  #[error("namespace at position {index} has no name")]
  NamespaceMissingName { index: usize },

  #[error("namespace {name} is declared more than once")]
  DuplicateNamespace { name: String },

  #[error("unknown connection type {kind:?} in namespace {namespace}")]
  UnknownConnectionType { namespace: String, kind: String },

  #[error("connection {name} in namespace {namespace} is invalid: {reason}")]
  InvalidConnection {
    namespace: String,
    name: String,
    reason: String,
  },

  #[error("authentication for domain {domain} in namespace {namespace} has an empty value")]
  EmptyAuthValue { namespace: String, domain: String },

  #[error("query at position {index} in namespace {namespace} has no name")]
  QueryMissingName { namespace: String, index: usize },

  #[error("query {name} in namespace {namespace} has no query text")]
  QueryMissingText { namespace: String, name: String },

  #[error("query {name} in namespace {namespace} has invalid type {kind:?}")]
  InvalidQueryType {
    namespace: String,
    name: String,
    kind: String,
  },

  #[error("query {name} in namespace {namespace} has negative varCount {count}")]
  NegativeVarCount {
    namespace: String,
    name: String,
    count: i32,
  },

  #[error("workflow at position {index} in namespace {namespace} has no name")]
  WorkflowMissingName { namespace: String, index: usize },

  #[error("workflow at position {index} in namespace {namespace} has a non-unique name {name}")]
  DuplicateWorkflowName {
    namespace: String,
    index: usize,
    name: String,
  },

  #[error("workflow {namespace}::{workflow} missing steps")]
  WorkflowMissingSteps { namespace: String, workflow: String },

  #[error("workflow {namespace}::{workflow}'s schedule has no 'every' values")]
  ScheduleMissingInterval { namespace: String, workflow: String },

  #[error("workflow {namespace}::{workflow} trigger {index} has unknown source {trigger_source:?}")]
  UnknownTriggerSource {
    namespace: String,
    workflow: String,
    index: usize,
    trigger_source: String,
  },

  #[error("workflow {namespace}::{workflow} trigger {index} has no resource")]
  TriggerMissingResource {
    namespace: String,
    workflow: String,
    index: usize,
  },

  #[error("workflow {namespace}::{workflow} trigger {index} has no topic")]
  TriggerMissingTopic {
    namespace: String,
    workflow: String,
    index: usize,
  },

  /// Two workflows in one namespace registered the same route.
  #[error("workflow {namespace}::{workflow} registers {route}, already registered by {existing}")]
  RouteConflict {
    namespace: String,
    workflow: String,
    route: Route,
    existing: String,
  },

  #[error("{at} isn't an fn or group")]
  MalformedStep { at: StepLocation },

  #[error("{at} has a call with no fn")]
  MissingFn { at: StepLocation },

  #[error("{at} lists mod that does not have a properly formed FQMN: {reference}")]
  MalformedReference {
    at: StepLocation,
    reference: String,
    #[source]
    cause: FqmnError,
  },

  #[error("{at} lists mod that does not exist: {reference} (did you forget a namespace?)")]
  ModuleNotFound { at: StepLocation, reference: String },

  /// The reference matched a module that has no computed address.
  #[error("{at} lists mod {reference} that could not be addressed (is its ref empty?)")]
  ModuleUnaddressed { at: StepLocation, reference: String },

  #[error("{at} references a key not yet available: {key}")]
  StateKeyUnavailable { at: StepLocation, key: String },

  #[error("{at} has onErr.any set alongside onErr.code, use onErr.other instead")]
  ErrHandlerAnyWithCode { at: StepLocation },

  #[error("{at} has onErr.other set without onErr.code, use onErr.any instead")]
  ErrHandlerOtherWithoutCode { at: StepLocation },

  #[error("{at} has invalid onErr directive {directive:?}, must be continue or return")]
  InvalidDirective { at: StepLocation, directive: String },

  #[error(
    "workflow {namespace}::{workflow} has group as last step but does not include 'response' field"
  )]
  GroupWithoutResponse { namespace: String, workflow: String },
}

/// Every problem found in a tenant config, in discovery order.
///
/// Renders as `found N problems:` followed by one tab-indented line per
/// problem.
#[derive(Debug, Default)]
pub struct Problems(Vec<Problem>);

impl Problems {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, problem: Problem) {
    self.0.push(problem);
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Problem> {
    self.0.iter()
  }

  /// `Ok(())` when nothing was found, otherwise `Err(self)`.
  pub fn into_result(self) -> Result<(), Problems> {
    if self.is_empty() { Ok(()) } else { Err(self) }
  }
}

impl fmt::Display for Problems {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "found {} problems:", self.0.len())?;
    for problem in &self.0 {
      write!(f, "\n\t{problem}")?;
    }
    Ok(())
  }
}

impl std::error::Error for Problems {}

impl IntoIterator for Problems {
  type Item = Problem;
  type IntoIter = std::vec::IntoIter<Problem>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}

impl<'a> IntoIterator for &'a Problems {
  type Item = &'a Problem;
  type IntoIter = std::slice::Iter<'a, Problem>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}
