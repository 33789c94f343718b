//! tenantspec Config
//!
//! Serializable tenant configuration: the modules a tenant has deployed, the
//! namespaces that partition it, and the workflows that compose module calls
//! into steps and fan-out groups.
//!
//! Configuration can be loaded from:
//! - JSON (the wire format between control plane and data plane)
//! - YAML tenant files written by hand
//!
//! Decoding backfills each module's FQMN but does not validate; the
//! `tenantspec-validator` crate links workflow steps against the declared
//! modules and reports every defect it finds.

mod connection;
mod directive;
mod error;
mod module;
mod query;
mod step;
mod tenant;
mod workflow;

pub use connection::{
  CONNECTION_TYPE_KAFKA, CONNECTION_TYPE_MYSQL, CONNECTION_TYPE_NATS, CONNECTION_TYPE_POSTGRES,
  CONNECTION_TYPE_REDIS, Connection, ConnectionConfig, DbConnection, KafkaConnection,
  NatsConnection, RedisConnection,
};
pub use directive::{Directive, ErrHandler};
pub use error::{ConfigError, ConnectionError};
pub use module::{Module, ModuleRevision};
pub use query::{DbQuery, QueryType};
pub use step::{CallableFn, Step, StepDef};
pub use tenant::{
  AuthHeader, Authentication, Capabilities, DEFAULT_HEADER_TYPE, Format, ModuleTable, NamespaceConfig,
  TenantConfig,
};
pub use workflow::{
  Route, Schedule, ScheduleEvery, TRIGGER_SOURCE_KAFKA, TRIGGER_SOURCE_NATS,
  TRIGGER_SOURCE_SERVER, Trigger, Workflow,
};

pub use tenantspec_fqmn::{Fqmn, FqmnError, NAMESPACE_DEFAULT};
