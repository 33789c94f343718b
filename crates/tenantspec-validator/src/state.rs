use std::collections::BTreeSet;

/// The state keys a workflow step may read.
///
/// A snapshot is never modified in place. Each step is checked against the
/// snapshot it started with and the next step gets an extended copy, so calls
/// in the same group cannot see each other's bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailableState {
  keys: BTreeSet<String>,
}

impl AvailableState {
  /// A snapshot holding exactly `keys`, e.g. a schedule's seed state.
  pub fn seeded<I, K>(keys: I) -> Self
  where
    I: IntoIterator<Item = K>,
    K: Into<String>,
  {
    Self {
      keys: keys.into_iter().map(Into::into).collect(),
    }
  }

  pub fn contains(&self, key: &str) -> bool {
    self.keys.contains(key)
  }

  /// A new snapshot with `keys` added.
  pub fn extended<I, K>(&self, keys: I) -> Self
  where
    I: IntoIterator<Item = K>,
    K: Into<String>,
  {
    let mut next = self.keys.clone();
    next.extend(keys.into_iter().map(Into::into));
    Self { keys: next }
  }

  pub fn len(&self) -> usize {
    self.keys.len()
  }

  pub fn is_empty(&self) -> bool {
    self.keys.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.keys.iter().map(String::as_str)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extended_leaves_original_untouched() {
    let seed = AvailableState::seeded(["token"]);
    let next = seed.extended(["user", "details"]);

    assert!(!seed.contains("user"));
    assert!(next.contains("token"));
    assert!(next.contains("user"));
    assert_eq!(next.len(), 3);
    assert_eq!(next.iter().collect::<Vec<_>>(), ["details", "token", "user"]);
  }

  #[test]
  fn test_default_is_empty() {
    assert!(AvailableState::default().is_empty());
  }
}
