use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::step::Step;

pub const TRIGGER_SOURCE_SERVER: &str = "server";
pub const TRIGGER_SOURCE_NATS: &str = "nats";
pub const TRIGGER_SOURCE_KAFKA: &str = "kafka";

/// A named, ordered composition of module calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub steps: Vec<Step>,
  /// State key used to build the workflow's reply.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub response: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub schedule: Option<Schedule>,
  #[serde(default)]
  pub triggers: Vec<Trigger>,
}

impl Workflow {
  pub fn new(name: impl Into<String>, steps: impl IntoIterator<Item = Step>) -> Self {
    Self {
      name: name.into(),
      steps: steps.into_iter().collect(),
      ..Default::default()
    }
  }

  /// The response key, if one is set and non-empty.
  pub fn response_key(&self) -> Option<&str> {
    self.response.as_deref().filter(|r| !r.is_empty())
  }
}

/// Periodic trigger for a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
  #[serde(default)]
  pub every: ScheduleEvery,
  /// Initial state made available to the workflow's first step.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub state: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEvery {
  #[serde(default, skip_serializing_if = "is_zero")]
  pub seconds: u32,
  #[serde(default, skip_serializing_if = "is_zero")]
  pub minutes: u32,
  #[serde(default, skip_serializing_if = "is_zero")]
  pub hours: u32,
  #[serde(default, skip_serializing_if = "is_zero")]
  pub days: u32,
}

fn is_zero(value: &u32) -> bool {
  *value == 0
}

impl Schedule {
  /// Total length of the `every` interval in seconds.
  pub fn number_of_seconds(&self) -> u64 {
    let every = &self.every;
    u64::from(every.seconds)
      + 60 * u64::from(every.minutes)
      + 60 * 60 * u64::from(every.hours)
      + 60 * 60 * 24 * u64::from(every.days)
  }

  pub fn interval(&self) -> Duration {
    Duration::from_secs(self.number_of_seconds())
  }
}

/// An event source bound to a workflow.
///
/// `server` triggers (the default when `source` is empty) are addressed by
/// `method` and `resource`; message-bus triggers by `topic`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub source: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub topic: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub method: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub resource: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub sink: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub sink_topic: String,
}

impl Trigger {
  pub fn http(method: impl Into<String>, resource: impl Into<String>) -> Self {
    Self {
      source: TRIGGER_SOURCE_SERVER.to_string(),
      method: method.into(),
      resource: resource.into(),
      ..Default::default()
    }
  }

  pub fn topic(source: impl Into<String>, topic: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      topic: topic.into(),
      ..Default::default()
    }
  }

  /// The effective source, with empty meaning `server`.
  pub fn source(&self) -> &str {
    if self.source.is_empty() {
      TRIGGER_SOURCE_SERVER
    } else {
      &self.source
    }
  }

  /// The route this trigger occupies in its namespace.
  pub fn route(&self) -> Route {
    if self.source() == TRIGGER_SOURCE_SERVER {
      let method = if self.method.is_empty() {
        "GET".to_string()
      } else {
        self.method.to_ascii_uppercase()
      };

      Route::Http {
        method,
        resource: self.resource.clone(),
      }
    } else {
      Route::Topic {
        source: self.source().to_string(),
        topic: self.topic.clone(),
      }
    }
  }
}

/// A route a trigger registers; two workflows may not share one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Route {
  Http { method: String, resource: String },
  Topic { source: String, topic: String },
}

impl fmt::Display for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Route::Http { method, resource } => write!(f, "{method} {resource}"),
      Route::Topic { source, topic } => write!(f, "{source}:{topic}"),
    }
  }
}
