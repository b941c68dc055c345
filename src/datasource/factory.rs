//! Factory seam for building datasource handles

use crate::datasource::descriptor::DatasourceDescriptor;
use crate::error::Result;
use async_trait::async_trait;

/// Builds a live handle (usually a connection pool) from a descriptor
///
/// The registry calls `build` while holding its writer lock, so a slow build
/// delays other registrations and removals but never readers.
///
/// # Example
/// ```rust
/// use async_trait::async_trait;
/// use rustf_datasource::{DatasourceDescriptor, DatasourceFactory, Result};
///
/// struct UrlFactory;
///
/// #[async_trait]
/// impl DatasourceFactory for UrlFactory {
///     type Handle = String;
///
///     async fn build(&self, descriptor: &DatasourceDescriptor) -> Result<String> {
///         Ok(descriptor.url.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait DatasourceFactory: Send + Sync + 'static {
    /// Handle produced for each descriptor
    type Handle: Send + Sync + 'static;

    /// Build a handle for `descriptor`
    ///
    /// # Returns
    /// * `Ok(handle)` - Ready to use handle
    /// * `Err(Error)` - The descriptor is invalid or the backend is unreachable
    async fn build(&self, descriptor: &DatasourceDescriptor) -> Result<Self::Handle>;
}
