//! Global datasource access for RustF applications
//!
//! Applications that want one process-wide registry initialise it once at
//! startup and open a context per request from anywhere.
//!
//! # Examples
//! ```rust,no_run
//! use rustf_datasource::{DatasourceConfig, DatasourcesConfig, DS};
//!
//! # async fn run() -> rustf_datasource::Result<()> {
//! let mut config = DatasourcesConfig::new();
//! config.add_datasource(
//!     "primary",
//!     DatasourceConfig::new("postgres://app@localhost/main").default_datasource(),
//! );
//! DS::init(config).await?;
//!
//! let mut ctx = DS::context()?;
//! ctx.select("primary")?;
//! # Ok(())
//! # }
//! ```

use crate::adapters::SqlxFactory;
use crate::config::DatasourcesConfig;
use crate::datasource::{DatasourceContext, DatasourceRegistry};
use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Global datasource registry
static REGISTRY: OnceCell<Arc<DatasourceRegistry<SqlxFactory>>> = OnceCell::new();

/// Global datasource access point
pub struct DS;

impl DS {
    /// Initialize the global registry from configuration
    ///
    /// # Returns
    /// * `Ok(())` - All configured datasources were built
    /// * `Err(Error)` - A datasource failed to build, or the registry was already initialized
    pub async fn init(config: DatasourcesConfig) -> Result<()> {
        if REGISTRY.get().is_some() {
            return Err(Error::internal("Datasource registry has already been initialized"));
        }

        log::info!("Initializing {} datasource(s)", config.len());
        let registry = DatasourceRegistry::from_config(SqlxFactory, &config).await?;

        REGISTRY
            .set(Arc::new(registry))
            .map_err(|_| Error::internal("Datasource registry has already been initialized"))
    }

    /// Get access to the global registry
    pub fn registry() -> Result<Arc<DatasourceRegistry<SqlxFactory>>> {
        REGISTRY
            .get()
            .cloned()
            .ok_or_else(|| Error::internal("Datasource registry not initialized"))
    }

    /// Open a new execution context on the global registry
    pub fn context() -> Result<DatasourceContext<SqlxFactory>> {
        Ok(Self::registry()?.context())
    }

    /// Check if the global registry is initialized
    pub fn is_initialized() -> bool {
        REGISTRY.get().is_some()
    }
}
