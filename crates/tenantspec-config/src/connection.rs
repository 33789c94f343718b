use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConnectionError;

pub const CONNECTION_TYPE_NATS: &str = "nats";
pub const CONNECTION_TYPE_KAFKA: &str = "kafka";
pub const CONNECTION_TYPE_REDIS: &str = "redis";
pub const CONNECTION_TYPE_MYSQL: &str = "mysql";
pub const CONNECTION_TYPE_POSTGRES: &str = "postgres";

/// A connection to an external resource.
///
/// The per-type settings live next to `type` and `name` in the same object and
/// are kept as raw JSON until [`Connection::config`] interprets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
  #[serde(rename = "type", default)]
  pub kind: String,
  #[serde(default)]
  pub name: String,
  #[serde(flatten)]
  pub settings: serde_json::Map<String, serde_json::Value>,
}

/// A connection's settings, interpreted according to its type.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionConfig {
  Nats(NatsConnection),
  Kafka(KafkaConnection),
  Redis(RedisConnection),
  Database(DbConnection),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NatsConnection {
  #[serde(default)]
  pub server_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KafkaConnection {
  #[serde(default)]
  pub broker_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedisConnection {
  #[serde(default)]
  pub server_address: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub username: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub password: Option<String>,
}

/// A relational database; `kind` is `mysql` or `postgres`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbConnection {
  #[serde(skip)]
  pub kind: String,
  #[serde(default)]
  pub connection_string: String,
}

impl Connection {
  pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      kind: kind.into(),
      name: name.into(),
      settings: serde_json::Map::new(),
    }
  }

  /// Attach a per-type setting, e.g. `serverAddress`.
  pub fn setting(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
    self.settings.insert(key.into(), value.into());
    self
  }

  /// Interpret the settings for this connection's type and check that the
  /// fields that type requires are present.
  pub fn config(&self) -> Result<ConnectionConfig, ConnectionError> {
    let config = match self.kind.as_str() {
      CONNECTION_TYPE_NATS => {
        let nats: NatsConnection = self.decode()?;
        require("serverAddress", &nats.server_address)?;
        ConnectionConfig::Nats(nats)
      }
      CONNECTION_TYPE_KAFKA => {
        let kafka: KafkaConnection = self.decode()?;
        require("brokerAddress", &kafka.broker_address)?;
        ConnectionConfig::Kafka(kafka)
      }
      CONNECTION_TYPE_REDIS => {
        let redis: RedisConnection = self.decode()?;
        require("serverAddress", &redis.server_address)?;
        ConnectionConfig::Redis(redis)
      }
      CONNECTION_TYPE_MYSQL | CONNECTION_TYPE_POSTGRES => {
        let mut db: DbConnection = self.decode()?;
        require("connectionString", &db.connection_string)?;
        db.kind = self.kind.clone();
        ConnectionConfig::Database(db)
      }
      other => return Err(ConnectionError::UnknownType(other.to_string())),
    };

    Ok(config)
  }

  fn decode<T: DeserializeOwned>(&self) -> Result<T, ConnectionError> {
    let settings = serde_json::Value::Object(self.settings.clone());
    Ok(serde_json::from_value(settings)?)
  }
}

fn require(field: &'static str, value: &str) -> Result<(), ConnectionError> {
  if value.is_empty() {
    return Err(ConnectionError::MissingField(field));
  }
  Ok(())
}
