//! Datasource configuration structures
//!
//! Describes the datasources a registry starts with. The structure matches a
//! TOML table per datasource, keyed by name:
//!
//! ```toml
//! [primary]
//! url = "postgres://app@localhost/main"
//! is_default = true
//!
//! [analytics]
//! url = "mysql://app@localhost/analytics"
//! max_connections = 4
//! ```

use crate::datasource::descriptor::{DatasourceDescriptor, PoolSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for a single datasource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasourceConfig {
    /// Database connection URL (required)
    pub url: String,

    /// Pool settings, all optional
    #[serde(flatten)]
    pub pool: PoolSettings,

    /// Whether this datasource should be the registry default
    #[serde(default)]
    pub is_default: bool,
}

impl DatasourceConfig {
    /// Create a configuration with default pool settings
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool: PoolSettings::default(),
            is_default: false,
        }
    }

    /// Mark as default datasource
    pub fn default_datasource(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Descriptor for this configuration registered under `name`
    pub fn descriptor(&self, name: impl Into<String>) -> DatasourceDescriptor {
        DatasourceDescriptor {
            name: name.into(),
            url: self.url.clone(),
            pool: self.pool.clone(),
        }
    }
}

/// Configuration for multiple datasources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasourcesConfig {
    /// Map of datasource name to configuration
    #[serde(flatten)]
    pub datasources: BTreeMap<String, DatasourceConfig>,
}

impl DatasourcesConfig {
    /// Create a new empty datasources configuration
    pub fn new() -> Self {
        Self {
            datasources: BTreeMap::new(),
        }
    }

    /// Parse a configuration from TOML text
    #[cfg(feature = "config")]
    pub fn from_toml_str(content: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Add a datasource configuration
    pub fn add_datasource(&mut self, name: impl Into<String>, config: DatasourceConfig) {
        self.datasources.insert(name.into(), config);
    }

    /// Get a datasource configuration by name
    pub fn get(&self, name: &str) -> Option<&DatasourceConfig> {
        self.datasources.get(name)
    }

    /// Get the default datasource configuration
    ///
    /// Returns the datasource marked as default, or the first one by name if
    /// none is marked
    pub fn get_default(&self) -> Option<(&String, &DatasourceConfig)> {
        self.datasources
            .iter()
            .find(|(_, config)| config.is_default)
            .or_else(|| self.datasources.iter().next())
    }

    /// Descriptors for every configured datasource, ordered by name
    pub fn descriptors(&self) -> Vec<DatasourceDescriptor> {
        self.datasources
            .iter()
            .map(|(name, config)| config.descriptor(name.as_str()))
            .collect()
    }

    /// Check if any datasources are configured
    pub fn is_empty(&self) -> bool {
        self.datasources.is_empty()
    }

    /// Get the number of configured datasources
    pub fn len(&self) -> usize {
        self.datasources.len()
    }

    /// List all datasource names
    pub fn list_names(&self) -> Vec<String> {
        self.datasources.keys().cloned().collect()
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(&mut self, other: DatasourcesConfig) {
        self.datasources.extend(other.datasources);
    }
}
