//! tenantspec Validator
//!
//! Proves a [`TenantConfig`](tenantspec_config::TenantConfig) is internally
//! consistent and links every workflow step to a concrete module.
//!
//! Validation never stops at the first defect. It runs in four phases:
//! 1. Address backfill for modules without an FQMN
//! 2. Tenant structure: identifier, module names, duplicates
//! 3. Per-namespace checks: connections, authentication, queries, workflow
//!    names, schedules, trigger routes
//! 4. Step linking and dataflow: each call is resolved against the tenant's
//!    modules, and each step may only read state produced by earlier steps
//!
//! Every problem found is returned in a single [`Problems`] list.

mod linker;
mod problem;
mod routes;
mod state;
mod validator;

pub use problem::{Problem, Problems, StepLocation};
pub use routes::RouteTable;
pub use state::AvailableState;
pub use validator::validate;
