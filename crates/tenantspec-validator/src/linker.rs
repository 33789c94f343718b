use tenantspec_config::{CallableFn, ErrHandler, ModuleTable, Step, Workflow};

use crate::problem::{Problem, Problems, StepLocation};
use crate::state::AvailableState;

/// Links workflow steps to the modules of one tenant.
pub(crate) struct Linker<'a> {
  modules: ModuleTable<'a>,
}

impl<'a> Linker<'a> {
  pub(crate) fn new(modules: ModuleTable<'a>) -> Self {
    Self { modules }
  }

  /// Resolve every call in `workflow`, record the linked addresses and check
  /// that each step only reads state produced before it.
  pub(crate) fn link_workflow(&self, namespace: &str, workflow: &mut Workflow, problems: &mut Problems) {
    let Workflow {
      name,
      steps,
      schedule,
      ..
    } = workflow;

    let mut state = match schedule {
      Some(schedule) => AvailableState::seeded(schedule.state.keys().cloned()),
      None => AvailableState::default(),
    };

    for (index, step) in steps.iter_mut().enumerate() {
      let at = StepLocation {
        namespace: namespace.to_string(),
        workflow: name.clone(),
        step: index,
      };

      if let Step::Malformed(_) = step {
        problems.push(Problem::MalformedStep { at });
        continue;
      }

      let mut produced = Vec::new();

      for call in step.calls_mut() {
        if self.link_call(&at, call, problems) {
          produced.push(call.binding_key().to_string());
        }

        check_inputs(&at, call, &state, problems);

        if let Some(handler) = &call.on_err {
          check_err_handler(&at, handler, problems);
        }
      }

      state = state.extended(produced);
    }
  }

  /// Resolve `call.func` and write the module's address into the call.
  /// Returns whether the call was linked.
  fn link_call(&self, at: &StepLocation, call: &mut CallableFn, problems: &mut Problems) -> bool {
    if call.func.is_empty() {
      problems.push(Problem::MissingFn { at: at.clone() });
      return false;
    }

    let module = match self.modules.find(&call.func) {
      Ok(Some(module)) => module,
      Ok(None) => {
        problems.push(Problem::ModuleNotFound {
          at: at.clone(),
          reference: call.func.clone(),
        });
        return false;
      }
      Err(cause) => {
        problems.push(Problem::MalformedReference {
          at: at.clone(),
          reference: call.func.clone(),
          cause,
        });
        return false;
      }
    };

    match &module.fqmn {
      Some(fqmn) => {
        call.fqmn = Some(fqmn.clone());
        true
      }
      None => {
        problems.push(Problem::ModuleUnaddressed {
          at: at.clone(),
          reference: call.func.clone(),
        });
        false
      }
    }
  }
}

fn check_inputs(at: &StepLocation, call: &CallableFn, state: &AvailableState, problems: &mut Problems) {
  for key in call.with.values() {
    if !state.contains(key) {
      problems.push(Problem::StateKeyUnavailable {
        at: at.clone(),
        key: key.clone(),
      });
    }
  }
}

fn check_err_handler(at: &StepLocation, handler: &ErrHandler, problems: &mut Problems) {
  if !handler.code.is_empty() && handler.any.is_some() {
    problems.push(Problem::ErrHandlerAnyWithCode { at: at.clone() });
  }

  if handler.code.is_empty() && handler.other.is_some() {
    problems.push(Problem::ErrHandlerOtherWithoutCode { at: at.clone() });
  }

  let directives = handler
    .code
    .values()
    .chain(handler.any.iter())
    .chain(handler.other.iter());

  for directive in directives.filter(|d| !d.is_valid()) {
    problems.push(Problem::InvalidDirective {
      at: at.clone(),
      directive: directive.to_string(),
    });
  }
}
