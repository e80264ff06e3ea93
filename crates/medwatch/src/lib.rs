//! Occupational-health risk scoring and audit rollups for multi-tenant clinic backends.
//!
//! The engines read records through the storage traits in [`workflows::risk::repository`] and
//! [`workflows::audit::repository`] and write derived records back through the same traits.
//! [`storage::InMemoryStore`] is the reference implementation used by the CLI and tests.

pub mod config;
pub mod error;
pub mod import;
pub mod storage;
pub mod telemetry;
pub mod workflows;
