//! RustF Datasource - named backend pools with per-context routing
//!
//! This crate lets a running RustF application hold several independently
//! configured connection pools at once and pick one of them for each unit of
//! work:
//! - A registry mapping datasource names to live pools, seeded with a default
//! - Add / overwrite / remove at runtime without restarting the process
//! - Per-context selection of the "current" datasource
//! - A sqlx-backed factory for PostgreSQL, MySQL and SQLite pools
//!
//! # Example
//! ```rust,no_run
//! use rustf_datasource::{DatasourceDescriptor, DatasourceRegistry, SqlxFactory};
//! use std::sync::Arc;
//!
//! # async fn run() -> rustf_datasource::Result<()> {
//! let primary = DatasourceDescriptor::builder("primary")
//!     .url("postgres://app@localhost/main")
//!     .build()?;
//! let registry = Arc::new(DatasourceRegistry::new(SqlxFactory, primary).await?);
//!
//! let tenant = DatasourceDescriptor::builder("tenant_42")
//!     .url("postgres://app@shard-3/tenant_42")
//!     .max_connections(4)
//!     .build()?;
//!
//! let mut ctx = registry.context();
//! ctx.add_and_select(tenant, false).await?;
//! let pool = ctx.resolve_current()?;
//! pool.ping().await?;
//! # Ok(())
//! # }
//! ```

// Enforce error handling best practices
#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used,))]

pub mod adapters;
pub mod config;
pub mod datasource;
pub mod error;

// Global registry access backed by the sqlx factory
pub mod global;

// Re-export main types for public API
pub use adapters::{SqlxFactory, SqlxPool};
pub use config::{DatasourceConfig, DatasourcesConfig};
pub use datasource::{
    AddOutcome, DatabaseBackend, DatasourceContext, DatasourceDescriptor, DatasourceFactory,
    DatasourceRegistry, DescriptorBuilder, PoolSettings, RegistryStats,
};
pub use error::{Error, Result};
pub use global::DS;
