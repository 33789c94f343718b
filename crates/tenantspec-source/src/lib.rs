//! tenantspec Source
//!
//! The boundary between a control plane and a data plane. A [`Source`]
//! relays tenant configs; a [`TenantStore`] keeps the latest *validated*
//! config of one tenant and refreshes it from its source.
//!
//! Sources:
//! - [`FileSource`]: one JSON or YAML file per tenant in a directory
//! - [`StaticSource`]: in-memory configs published by the caller

mod error;
mod file;
mod memory;
mod overview;
mod source;
mod store;

pub use error::SourceError;
pub use file::FileSource;
pub use memory::StaticSource;
pub use overview::{Overview, References, State, TenantOverview};
pub use source::Source;
pub use store::{RefreshOutcome, TenantStore};
