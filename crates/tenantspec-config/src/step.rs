use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::directive::{Directive, ErrHandler};

/// A call to a module from inside a workflow step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallableFn {
  /// Module reference: a name, a `namespace::name`, or any FQMN form.
  #[serde(rename = "fn", default)]
  pub func: String,
  /// Address of the module this call was linked to during validation.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fqmn: Option<String>,
  #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
  pub alias: Option<String>,
  /// Callee input key -> local state key.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub with: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub on_err: Option<ErrHandler>,
}

impl CallableFn {
  pub fn new(func: impl Into<String>) -> Self {
    Self {
      func: func.into(),
      ..Default::default()
    }
  }

  /// Bind the call's output under `alias` instead of its reference.
  pub fn alias(mut self, alias: impl Into<String>) -> Self {
    self.alias = Some(alias.into());
    self
  }

  /// Feed the state key `state_key` to the callee as `input`.
  pub fn with(mut self, input: impl Into<String>, state_key: impl Into<String>) -> Self {
    self.with.insert(input.into(), state_key.into());
    self
  }

  pub fn on_err(mut self, handler: ErrHandler) -> Self {
    self.on_err = Some(handler);
    self
  }

  /// The state key this call's output is stored under.
  pub fn binding_key(&self) -> &str {
    match self.alias.as_deref() {
      Some(alias) if !alias.is_empty() => alias,
      _ => &self.func,
    }
  }

  /// Decide how a workflow proceeds after this call failed with `code`.
  pub fn on_status(&self, code: u16) -> Directive {
    match &self.on_err {
      Some(handler) => handler.decide(code),
      None => Directive::Return,
    }
  }

  /// Whether a failure with `code` aborts the workflow.
  pub fn should_return(&self, code: u16) -> bool {
    self.on_status(code) != Directive::Continue
  }
}

/// The raw wire shape of a step.
///
/// A single step is a flattened [`CallableFn`]; a group is `{"group": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDef {
  #[serde(rename = "fn", default, skip_serializing_if = "Option::is_none")]
  pub func: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fqmn: Option<String>,
  #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
  pub alias: Option<String>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub with: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub on_err: Option<ErrHandler>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub group: Option<Vec<CallableFn>>,
}

/// One unit of workflow execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StepDef", into = "StepDef")]
pub enum Step {
  /// A single module call.
  Single(CallableFn),
  /// Calls executed concurrently as one atomic fan-out step.
  Group(Vec<CallableFn>),
  /// A wire shape that is neither a single call nor a non-empty group.
  Malformed(StepDef),
}

impl Step {
  pub fn single(call: CallableFn) -> Self {
    Step::Single(call)
  }

  pub fn group(calls: impl IntoIterator<Item = CallableFn>) -> Self {
    Step::Group(calls.into_iter().collect())
  }

  pub fn is_single(&self) -> bool {
    matches!(self, Step::Single(_))
  }

  pub fn is_group(&self) -> bool {
    matches!(self, Step::Group(_))
  }

  /// The calls made by this step; empty for a malformed step.
  pub fn calls(&self) -> &[CallableFn] {
    match self {
      Step::Single(call) => std::slice::from_ref(call),
      Step::Group(calls) => calls,
      Step::Malformed(_) => &[],
    }
  }

  pub fn calls_mut(&mut self) -> &mut [CallableFn] {
    match self {
      Step::Single(call) => std::slice::from_mut(call),
      Step::Group(calls) => calls,
      Step::Malformed(_) => &mut [],
    }
  }
}

impl From<StepDef> for Step {
  fn from(def: StepDef) -> Self {
    let has_fn = def.func.as_deref().is_some_and(|f| !f.is_empty());
    let has_group = def.group.as_ref().is_some_and(|g| !g.is_empty());

    match (has_fn, has_group, def.group.is_some()) {
      (true, _, false) => Step::Single(CallableFn {
        func: def.func.unwrap_or_default(),
        fqmn: def.fqmn,
        alias: def.alias,
        with: def.with,
        on_err: def.on_err,
      }),
      (false, true, _) => Step::Group(def.group.unwrap_or_default()),
      _ => Step::Malformed(def),
    }
  }
}

impl From<Step> for StepDef {
  fn from(step: Step) -> Self {
    match step {
      Step::Single(call) => StepDef {
        func: Some(call.func),
        fqmn: call.fqmn,
        alias: call.alias,
        with: call.with,
        on_err: call.on_err,
        group: None,
      },
      Step::Group(calls) => StepDef {
        group: Some(calls),
        ..Default::default()
      },
      Step::Malformed(def) => def,
    }
  }
}
