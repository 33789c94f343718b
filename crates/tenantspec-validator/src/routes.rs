use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tenantspec_config::Route;

/// Routes registered by the workflows of one namespace.
#[derive(Debug, Default)]
pub struct RouteTable {
  routes: BTreeMap<Route, String>,
}

impl RouteTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Claim `route` for `workflow`.
  ///
  /// Returns the name of the workflow that already holds the route, if any.
  /// Every route can be claimed once, even by the workflow that holds it.
  pub fn register(&mut self, route: Route, workflow: &str) -> Result<(), &str> {
    match self.routes.entry(route) {
      Entry::Vacant(entry) => {
        entry.insert(workflow.to_string());
        Ok(())
      }
      Entry::Occupied(entry) => Err(entry.into_mut().as_str()),
    }
  }

  pub fn len(&self) -> usize {
    self.routes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.routes.is_empty()
  }
}
