//! Per-context datasource selection
//!
//! Every unit of concurrent work (a request, a job, a spawned task) owns one
//! [`DatasourceContext`]. The context records which datasource that work has
//! selected; nothing else can see or change it. Dispatch code asks the context
//! for the current handle with [`DatasourceContext::resolve_current`], which
//! falls back to the registry default while nothing is selected.

use crate::datasource::descriptor::DatasourceDescriptor;
use crate::datasource::factory::DatasourceFactory;
use crate::datasource::registry::{AddOutcome, DatasourceRegistry};
use crate::error::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Selection state of one execution context
pub struct DatasourceContext<F: DatasourceFactory> {
    registry: Arc<DatasourceRegistry<F>>,
    selection: Option<String>,
}

impl<F: DatasourceFactory> DatasourceContext<F> {
    pub(crate) fn new(registry: Arc<DatasourceRegistry<F>>) -> Self {
        Self {
            registry,
            selection: None,
        }
    }

    /// Registry this context routes into
    pub fn registry(&self) -> &Arc<DatasourceRegistry<F>> {
        &self.registry
    }

    /// Select a registered datasource
    ///
    /// # Returns
    /// * `Ok(())` - `name` is registered and now selected
    /// * `Err(Error::NotFound)` - `name` is not registered; the selection is unchanged
    pub fn select(&mut self, name: &str) -> Result<()> {
        if !self.registry.contains(name) {
            log::debug!("Cannot select unknown datasource '{}'", name);
            return Err(Error::not_found(name));
        }

        log::debug!("Selected datasource '{}'", name);
        self.selection = Some(name.to_string());
        Ok(())
    }

    /// Select the default datasource
    pub fn select_default(&mut self) {
        self.selection = Some(self.registry.default_name().to_string());
    }

    /// Register a datasource and select it
    ///
    /// Behaves like [`DatasourceRegistry::add`]; on success the descriptor's
    /// name becomes this context's selection, on error the selection is left
    /// as it was.
    pub async fn add_and_select(
        &mut self,
        descriptor: DatasourceDescriptor,
        overwrite: bool,
    ) -> Result<AddOutcome> {
        let name = descriptor.name.clone();
        let outcome = self.registry.add(descriptor, overwrite).await?;

        log::debug!("Selected datasource '{}'", name);
        self.selection = Some(name);
        Ok(outcome)
    }

    /// Name selected by this context, `None` while nothing is selected
    pub fn current_selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Remove a datasource unless this context has it selected
    ///
    /// Only this context's selection is checked. Another context that still
    /// has `name` selected gets `Error::NotFound` on its next resolution.
    ///
    /// # Returns
    /// * `Ok(Some(handle))` - The removed handle
    /// * `Ok(None)` - No datasource with that name was registered
    /// * `Err(Error::InUse)` - `name` is selected here or is the default datasource
    pub async fn remove(&self, name: &str) -> Result<Option<Arc<F::Handle>>> {
        self.registry
            .remove_guarded(name, self.selection.as_deref())
            .await
    }

    /// Handle for the current selection, or the default handle when unset
    pub fn resolve_current(&self) -> Result<Arc<F::Handle>> {
        match &self.selection {
            Some(name) => self.registry.resolve(name),
            None => Ok(self.registry.default_handle()),
        }
    }

    /// Open a sibling context that starts with this context's selection
    ///
    /// Useful when handing work off to a spawned task; the two selections are
    /// independent from then on.
    pub fn fork(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            selection: self.selection.clone(),
        }
    }
}

impl<F: DatasourceFactory> fmt::Debug for DatasourceContext<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasourceContext")
            .field("selection", &self.selection)
            .finish()
    }
}
