//! Dynamic datasource support
//!
//! This module provides the registry of named datasources, the factory seam
//! used to build their handles, and the per-context selection used to route
//! each unit of work to one of them.

pub mod context;
pub mod descriptor;
pub mod factory;
pub mod registry;

// Re-export main types for convenience
pub use context::DatasourceContext;
pub use descriptor::{DatabaseBackend, DatasourceDescriptor, DescriptorBuilder, PoolSettings};
pub use factory::DatasourceFactory;
pub use registry::{AddOutcome, DatasourceRegistry, RegistryStats};
