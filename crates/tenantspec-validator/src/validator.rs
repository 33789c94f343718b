use std::collections::BTreeSet;

use tenantspec_config::{
  ConnectionError, DEFAULT_HEADER_TYPE, Module, ModuleTable, NamespaceConfig, Step, TenantConfig,
  TRIGGER_SOURCE_KAFKA, TRIGGER_SOURCE_NATS, TRIGGER_SOURCE_SERVER, Workflow,
};
use tenantspec_fqmn::NAMESPACE_DEFAULT;
use tracing::{debug, instrument};

use crate::linker::Linker;
use crate::problem::{Problem, Problems};
use crate::routes::RouteTable;

/// Validate a tenant config and link its workflow steps to its modules.
///
/// Missing module addresses are backfilled first. Every step that resolves
/// has the module's address written into its `fqmn`. All problems are
/// collected; the config is valid only when none were found.
#[instrument(skip_all, fields(tenant = %config.identifier, version = config.tenant_version))]
pub fn validate(config: &mut TenantConfig) -> Result<(), Problems> {
  let mut problems = Problems::new();

  config.backfill_addresses();

  if config.identifier.is_empty() {
    problems.push(Problem::MissingIdentifier);
  }

  check_modules(&config.modules, &mut problems);
  check_namespace_names(&config.namespaces, &mut problems);

  let TenantConfig {
    identifier,
    default_namespace,
    namespaces,
    modules,
    ..
  } = config;

  let linker = Linker::new(ModuleTable::new(identifier, modules));

  check_namespace(&linker, default_namespace, &mut problems);
  for namespace in namespaces.iter_mut() {
    check_namespace(&linker, namespace, &mut problems);
  }

  debug!(problems = problems.len(), "tenant config validated");

  problems.into_result()
}

fn check_modules(modules: &[Module], problems: &mut Problems) {
  if modules.is_empty() {
    problems.push(Problem::NoModules);
  }

  let mut qualified = BTreeSet::new();
  let mut names = BTreeSet::new();
  let mut bare_defaults = BTreeSet::new();

  for (index, module) in modules.iter().enumerate() {
    if module.name.is_empty() {
      problems.push(Problem::ModuleMissingName { index });
      continue;
    }

    if module.namespace.is_empty() {
      problems.push(Problem::ModuleMissingNamespace { index });
    }

    let key = format!("{}::{}", module.namespace, module.name);
    let name = module.name.as_str();
    let is_default = module.namespace == NAMESPACE_DEFAULT;

    // default modules are also addressable by their bare name
    let duplicate = qualified.contains(&key)
      || (is_default && names.contains(name))
      || (!is_default && bare_defaults.contains(name));

    if duplicate {
      problems.push(Problem::DuplicateModule { key });
      continue;
    }

    qualified.insert(key);
    names.insert(name);
    if is_default {
      bare_defaults.insert(name);
    }
  }
}

fn check_namespace_names(namespaces: &[NamespaceConfig], problems: &mut Problems) {
  let mut seen = BTreeSet::from([NAMESPACE_DEFAULT]);

  for (index, namespace) in namespaces.iter().enumerate() {
    if namespace.name.is_empty() {
      problems.push(Problem::NamespaceMissingName { index });
    } else if !seen.insert(namespace.name.as_str()) {
      problems.push(Problem::DuplicateNamespace {
        name: namespace.name.clone(),
      });
    }
  }
}

fn check_namespace(linker: &Linker<'_>, namespace: &mut NamespaceConfig, problems: &mut Problems) {
  let label = if namespace.name.is_empty() {
    NAMESPACE_DEFAULT.to_string()
  } else {
    namespace.name.clone()
  };

  check_connections(&label, namespace, problems);
  check_authentication(&label, namespace, problems);
  check_queries(&label, namespace, problems);
  check_workflows(linker, &label, &mut namespace.workflows, problems);
}

fn check_connections(label: &str, namespace: &NamespaceConfig, problems: &mut Problems) {
  for connection in &namespace.connections {
    match connection.config() {
      Ok(_) => {}
      Err(ConnectionError::UnknownType(kind)) => problems.push(Problem::UnknownConnectionType {
        namespace: label.to_string(),
        kind,
      }),
      Err(err) => problems.push(Problem::InvalidConnection {
        namespace: label.to_string(),
        name: connection.name.clone(),
        reason: err.to_string(),
      }),
    }
  }
}

fn check_authentication(label: &str, namespace: &mut NamespaceConfig, problems: &mut Problems) {
  let Some(auth) = namespace.authentication.as_mut() else {
    return;
  };

  for (domain, header) in auth.domains.iter_mut() {
    if header.header_type.is_empty() {
      header.header_type = DEFAULT_HEADER_TYPE.to_string();
    }

    if header.value.is_empty() {
      problems.push(Problem::EmptyAuthValue {
        namespace: label.to_string(),
        domain: domain.clone(),
      });
    }
  }
}

fn check_queries(label: &str, namespace: &NamespaceConfig, problems: &mut Problems) {
  for (index, query) in namespace.queries.iter().enumerate() {
    if query.name.is_empty() {
      problems.push(Problem::QueryMissingName {
        namespace: label.to_string(),
        index,
      });
      continue;
    }

    if query.query.is_empty() {
      problems.push(Problem::QueryMissingText {
        namespace: label.to_string(),
        name: query.name.clone(),
      });
    }

    if let Some(Err(kind)) = query.query_type() {
      problems.push(Problem::InvalidQueryType {
        namespace: label.to_string(),
        name: query.name.clone(),
        kind: kind.to_string(),
      });
    }

    if query.var_count < 0 {
      problems.push(Problem::NegativeVarCount {
        namespace: label.to_string(),
        name: query.name.clone(),
        count: query.var_count,
      });
    }
  }
}

fn check_workflows(
  linker: &Linker<'_>,
  label: &str,
  workflows: &mut [Workflow],
  problems: &mut Problems,
) {
  let mut names = BTreeSet::new();
  let mut routes = RouteTable::new();

  for (index, workflow) in workflows.iter_mut().enumerate() {
    if workflow.name.is_empty() {
      problems.push(Problem::WorkflowMissingName {
        namespace: label.to_string(),
        index,
      });
      continue;
    }

    if !names.insert(workflow.name.clone()) {
      problems.push(Problem::DuplicateWorkflowName {
        namespace: label.to_string(),
        index,
        name: workflow.name.clone(),
      });
    }

    if workflow.steps.is_empty() {
      problems.push(Problem::WorkflowMissingSteps {
        namespace: label.to_string(),
        workflow: workflow.name.clone(),
      });
      continue;
    }

    if let Some(schedule) = &workflow.schedule {
      if schedule.number_of_seconds() == 0 {
        problems.push(Problem::ScheduleMissingInterval {
          namespace: label.to_string(),
          workflow: workflow.name.clone(),
        });
      }
    }

    check_triggers(label, workflow, &mut routes, problems);

    linker.link_workflow(label, workflow, problems);

    let ends_in_group = workflow.steps.last().is_some_and(Step::is_group);
    if ends_in_group && workflow.response_key().is_none() {
      problems.push(Problem::GroupWithoutResponse {
        namespace: label.to_string(),
        workflow: workflow.name.clone(),
      });
    }
  }
}

fn check_triggers(label: &str, workflow: &Workflow, routes: &mut RouteTable, problems: &mut Problems) {
  for (index, trigger) in workflow.triggers.iter().enumerate() {
    let source = trigger.source();

    let usable = match source {
      TRIGGER_SOURCE_SERVER if trigger.resource.is_empty() => {
        problems.push(Problem::TriggerMissingResource {
          namespace: label.to_string(),
          workflow: workflow.name.clone(),
          index,
        });
        false
      }
      TRIGGER_SOURCE_NATS | TRIGGER_SOURCE_KAFKA if trigger.topic.is_empty() => {
        problems.push(Problem::TriggerMissingTopic {
          namespace: label.to_string(),
          workflow: workflow.name.clone(),
          index,
        });
        false
      }
      TRIGGER_SOURCE_SERVER | TRIGGER_SOURCE_NATS | TRIGGER_SOURCE_KAFKA => true,
      other => {
        problems.push(Problem::UnknownTriggerSource {
          namespace: label.to_string(),
          workflow: workflow.name.clone(),
          index,
          trigger_source: other.to_string(),
        });
        false
      }
    };

    if !usable {
      continue;
    }

    let route = trigger.route();
    if let Err(existing) = routes.register(route.clone(), &workflow.name) {
      problems.push(Problem::RouteConflict {
        namespace: label.to_string(),
        workflow: workflow.name.clone(),
        route,
        existing: existing.to_string(),
      });
    }
  }
}

#[cfg(test)]
mod tests {
  use tenantspec_config::{CallableFn, Module};

  use super::*;

  #[test]
  fn test_duplicate_detection_is_order_independent() {
    for modules in [
      vec![Module::new("getUser", "default", "a"), Module::new("getUser", "db", "b")],
      vec![Module::new("getUser", "db", "b"), Module::new("getUser", "default", "a")],
    ] {
      let mut problems = Problems::new();
      check_modules(&modules, &mut problems);
      let problems: Vec<_> = problems.into_iter().collect();
      assert_eq!(problems.len(), 1, "{modules:?}");
      assert!(matches!(&problems[0], Problem::DuplicateModule { .. }));
    }
  }

  #[test]
  fn test_same_name_in_two_non_default_namespaces() {
    let modules = vec![Module::new("getUser", "db", "a"), Module::new("getUser", "api", "b")];
    let mut problems = Problems::new();
    check_modules(&modules, &mut problems);
    assert!(problems.is_empty());
  }

  #[test]
  fn test_missing_name_and_namespace() {
    let mut unnamed = Module::new("", "db", "a");
    unnamed.fqmn = Some("fqmn://t/db/x@a".to_string());
    let mut no_namespace = Module::new("getUser", "", "a");
    no_namespace.fqmn = Some("fqmn://t/default/getUser@a".to_string());

    let mut problems = Problems::new();
    check_modules(&[unnamed, no_namespace], &mut problems);
    let problems: Vec<_> = problems.into_iter().collect();
    assert!(matches!(&problems[0], Problem::ModuleMissingName { index: 0 }));
    assert!(matches!(&problems[1], Problem::ModuleMissingNamespace { index: 1 }));
  }

  #[test]
  fn test_namespace_names() {
    let namespaces = vec![
      NamespaceConfig::named("api"),
      NamespaceConfig::named(""),
      NamespaceConfig::named("api"),
      NamespaceConfig::named("default"),
    ];
    let mut problems = Problems::new();
    check_namespace_names(&namespaces, &mut problems);
    let problems: Vec<_> = problems.into_iter().collect();
    assert_eq!(problems.len(), 3);
    assert!(matches!(&problems[0], Problem::NamespaceMissingName { index: 1 }));
    assert!(matches!(&problems[1], Problem::DuplicateNamespace { name } if name == "api"));
    assert!(matches!(&problems[2], Problem::DuplicateNamespace { name } if name == "default"));
  }

  #[test]
  fn test_linking_is_idempotent() {
    let mut config = TenantConfig::new("dev.example.app");
    config.modules.push(Module::new("hello", "default", "v1"));
    config
      .default_namespace
      .workflows
      .push(Workflow::new("hello", [Step::single(CallableFn::new("hello"))]));

    validate(&mut config).unwrap();
    let first = config.clone();
    validate(&mut config).unwrap();
    assert_eq!(config, first);
  }
}
