//! Datasource registry for managing named backend handles
//!
//! The registry owns every live handle together with the descriptor it was
//! built from. Both are kept in one immutable snapshot that is replaced as a
//! whole on every change, so readers always see handles and descriptors for
//! exactly the same set of names.
//!
//! Writers (`add`, `remove`) are serialized by an async mutex that is held
//! across the check, the factory build and the publication. Readers
//! (`resolve`, `contains`, ...) load the current snapshot and never wait for
//! a writer.

use crate::config::DatasourcesConfig;
use crate::datasource::context::DatasourceContext;
use crate::datasource::descriptor::DatasourceDescriptor;
use crate::datasource::factory::DatasourceFactory;
use crate::error::{Error, Result};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// What `add` did to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// An equal descriptor was already registered, nothing was built
    Unchanged,
    /// The name was new
    Added,
    /// A different descriptor was overwritten with a freshly built handle
    Replaced,
}

struct Entry<H> {
    descriptor: Arc<DatasourceDescriptor>,
    handle: Arc<H>,
    registered_at: DateTime<Utc>,
}

impl<H> Entry<H> {
    fn new(descriptor: DatasourceDescriptor, handle: H) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            handle: Arc::new(handle),
            registered_at: Utc::now(),
        }
    }
}

// Derive would require `H: Clone`
impl<H> Clone for Entry<H> {
    fn clone(&self) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            handle: Arc::clone(&self.handle),
            registered_at: self.registered_at,
        }
    }
}

/// Published registry state
///
/// The default entry lives outside the map so it can never go missing.
struct Snapshot<H> {
    default: Entry<H>,
    others: HashMap<String, Entry<H>>,
}

impl<H> Snapshot<H> {
    fn get(&self, name: &str) -> Option<&Entry<H>> {
        if self.default.descriptor.name == name {
            Some(&self.default)
        } else {
            self.others.get(name)
        }
    }

    fn with_entry(&self, entry: Entry<H>) -> Self {
        if entry.descriptor.name == self.default.descriptor.name {
            return Self {
                default: entry,
                others: self.others.clone(),
            };
        }

        let mut others = self.others.clone();
        others.insert(entry.descriptor.name.clone(), entry);
        Self {
            default: self.default.clone(),
            others,
        }
    }

    fn without(&self, name: &str) -> Option<(Self, Entry<H>)> {
        let mut others = self.others.clone();
        let removed = others.remove(name)?;
        Some((
            Self {
                default: self.default.clone(),
                others,
            },
            removed,
        ))
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::iter::once(&self.default.descriptor.name)
            .chain(self.others.keys())
            .cloned()
            .collect();
        names.sort();
        names
    }
}

/// Registry of named datasources with a designated default
///
/// Share it behind an `Arc` and open one [`DatasourceContext`] per unit of
/// work with [`DatasourceRegistry::context`].
pub struct DatasourceRegistry<F: DatasourceFactory> {
    factory: F,
    default_name: String,
    snapshot: ArcSwap<Snapshot<F::Handle>>,
    write_lock: Mutex<()>,
}

impl<F: DatasourceFactory> DatasourceRegistry<F> {
    /// Create a registry, building the default datasource with `factory`
    ///
    /// # Returns
    /// * `Ok(registry)` - The default handle was built
    /// * `Err(Error)` - The factory could not build the default handle
    pub async fn new(factory: F, default: DatasourceDescriptor) -> Result<Self> {
        log::info!(
            "Registering default datasource '{}': {}",
            default.name,
            default.sanitized_url()
        );

        let handle = factory.build(&default).await.map_err(|e| {
            log::error!("Failed to build default datasource '{}': {}", default.name, e);
            e
        })?;

        Ok(Self::with_default_handle(factory, default, handle))
    }

    /// Create a registry around an already built default handle
    pub fn with_default_handle(factory: F, default: DatasourceDescriptor, handle: F::Handle) -> Self {
        let default_name = default.name.clone();
        let snapshot = Snapshot {
            default: Entry::new(default, handle),
            others: HashMap::new(),
        };

        Self {
            factory,
            default_name,
            snapshot: ArcSwap::from_pointee(snapshot),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a registry from configuration
    ///
    /// The configured default seeds the registry; every other entry is added
    /// without overwrite.
    pub async fn from_config(factory: F, config: &DatasourcesConfig) -> Result<Self> {
        let (default_name, _) = config
            .get_default()
            .ok_or_else(|| Error::config("No datasources configured"))?;
        let default_name = default_name.clone();

        let mut descriptors = config.descriptors();
        let position = descriptors
            .iter()
            .position(|d| d.name == default_name)
            .ok_or_else(|| Error::internal("Configured default datasource disappeared"))?;
        let default = descriptors.swap_remove(position);

        let registry = Self::new(factory, default).await?;
        for descriptor in descriptors {
            registry.add(descriptor, false).await?;
        }

        Ok(registry)
    }

    /// Open a new execution context with nothing selected
    pub fn context(self: &Arc<Self>) -> DatasourceContext<F> {
        DatasourceContext::new(Arc::clone(self))
    }

    /// Register a datasource
    ///
    /// # Arguments
    /// * `descriptor` - Description of the datasource to build
    /// * `overwrite` - Whether a different descriptor registered under the same name may be replaced
    ///
    /// # Returns
    /// * `Ok(AddOutcome::Unchanged)` - An equal descriptor is already registered
    /// * `Ok(AddOutcome::Added)` / `Ok(AddOutcome::Replaced)` - A new handle was built and published
    /// * `Err(Error::Conflict)` - A different descriptor exists and `overwrite` is false
    /// * `Err(Error)` - The factory failed; the registry is unchanged
    pub async fn add(&self, descriptor: DatasourceDescriptor, overwrite: bool) -> Result<AddOutcome> {
        let _guard = self.write_lock.lock().await;

        // Only writers publish and they all hold the lock, so this stays current
        let current = self.snapshot.load_full();
        let replacing = match current.get(&descriptor.name) {
            Some(existing) if *existing.descriptor == descriptor => {
                log::debug!("Datasource '{}' already registered", descriptor.name);
                return Ok(AddOutcome::Unchanged);
            }
            Some(_) if !overwrite => {
                log::warn!(
                    "Refusing to replace datasource '{}' without overwrite",
                    descriptor.name
                );
                return Err(Error::conflict(descriptor.name));
            }
            Some(_) => true,
            None => false,
        };

        let handle = self.factory.build(&descriptor).await.map_err(|e| {
            log::error!("Failed to build datasource '{}': {}", descriptor.name, e);
            e
        })?;

        log::info!(
            "{} datasource '{}': {}",
            if replacing { "Replaced" } else { "Registered" },
            descriptor.name,
            descriptor.sanitized_url()
        );

        self.snapshot
            .store(Arc::new(current.with_entry(Entry::new(descriptor, handle))));

        Ok(if replacing {
            AddOutcome::Replaced
        } else {
            AddOutcome::Added
        })
    }

    /// Remove a datasource from the registry
    ///
    /// This is the removal of a caller that has nothing selected; use
    /// [`DatasourceContext::remove`] to also protect the caller's own selection.
    ///
    /// # Returns
    /// * `Ok(Some(handle))` - The removed handle
    /// * `Ok(None)` - No datasource with that name was registered
    /// * `Err(Error::InUse)` - `name` is the default datasource
    pub async fn remove(&self, name: &str) -> Result<Option<Arc<F::Handle>>> {
        self.remove_guarded(name, None).await
    }

    pub(crate) async fn remove_guarded(
        &self,
        name: &str,
        selected: Option<&str>,
    ) -> Result<Option<Arc<F::Handle>>> {
        if name == self.default_name {
            log::warn!("Refusing to remove the default datasource '{}'", name);
            return Err(Error::in_use(name));
        }
        if selected == Some(name) {
            log::warn!("Refusing to remove datasource '{}' selected by the caller", name);
            return Err(Error::in_use(name));
        }

        let _guard = self.write_lock.lock().await;
        let current = self.snapshot.load_full();
        let Some((next, removed)) = current.without(name) else {
            log::debug!("Datasource '{}' not registered, nothing to remove", name);
            return Ok(None);
        };

        self.snapshot.store(Arc::new(next));
        log::info!("Removed datasource '{}'", name);

        Ok(Some(removed.handle))
    }

    /// Get the handle registered under `name`
    ///
    /// # Returns
    /// * `Ok(handle)` - If the datasource exists
    /// * `Err(Error::NotFound)` - If no datasource with that name is registered
    pub fn resolve(&self, name: &str) -> Result<Arc<F::Handle>> {
        self.snapshot
            .load()
            .get(name)
            .map(|entry| Arc::clone(&entry.handle))
            .ok_or_else(|| Error::not_found(name))
    }

    /// Get the default handle
    pub fn default_handle(&self) -> Arc<F::Handle> {
        Arc::clone(&self.snapshot.load().default.handle)
    }

    /// Name of the default datasource
    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Check if a datasource is registered
    pub fn contains(&self, name: &str) -> bool {
        self.snapshot.load().get(name).is_some()
    }

    /// Descriptor registered under `name`
    pub fn descriptor(&self, name: &str) -> Option<Arc<DatasourceDescriptor>> {
        self.snapshot
            .load()
            .get(name)
            .map(|entry| Arc::clone(&entry.descriptor))
    }

    /// When the current handle for `name` was published
    pub fn registered_at(&self, name: &str) -> Option<DateTime<Utc>> {
        self.snapshot.load().get(name).map(|entry| entry.registered_at)
    }

    /// List all registered datasource names, sorted
    pub fn names(&self) -> Vec<String> {
        self.snapshot.load().names()
    }

    /// Number of registered datasources, default included
    pub fn len(&self) -> usize {
        self.snapshot.load().others.len() + 1
    }

    /// Always false, the default datasource is always registered
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The factory used for new datasources
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Get statistics about the registry
    pub fn stats(&self) -> RegistryStats {
        let snapshot = self.snapshot.load();

        RegistryStats {
            total_datasources: snapshot.others.len() + 1,
            default_datasource: self.default_name.clone(),
            datasource_names: snapshot.names(),
        }
    }
}

impl<F: DatasourceFactory> fmt::Debug for DatasourceRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasourceRegistry")
            .field("default", &self.default_name)
            .field("datasources", &self.names())
            .finish()
    }
}

/// Statistics about the datasource registry
#[derive(Debug, Clone)]
pub struct RegistryStats {
    /// Total number of registered datasources
    pub total_datasources: usize,
    /// Name of the default datasource
    pub default_datasource: String,
    /// Sorted list of all datasource names
    pub datasource_names: Vec<String>,
}
