//! Builder pattern for browser configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use media_browser::{BrowseOptions, MediaBrowser, ServiceComponent};
//!
//! let browser = MediaBrowser::builder()
//!     .component(ServiceComponent::new("com.example.music", "BrowserService")?)
//!     .client_name("com.example.player")
//!     .root_hints(BrowseOptions::new().with("recent", true))
//!     .callback(Arc::new(MyConnectionCallback))
//!     .binder(Arc::new(MyBinder::default()))
//!     .build()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::callback::ConnectionCallback;
use crate::error::{Error, Result};
use crate::identifiers::ServiceComponent;
use crate::options::BrowseOptions;
use crate::transport::TransportBinder;

use super::browser::MediaBrowser;

// ============================================================================
// MediaBrowserBuilder
// ============================================================================

/// Builder for configuring a [`MediaBrowser`].
///
/// Use [`MediaBrowser::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct MediaBrowserBuilder {
    /// Provider to bind.
    component: Option<ServiceComponent>,
    /// Client identity sent on connect.
    client_name: Option<String>,
    /// Root hints sent on connect.
    root_hints: Option<BrowseOptions>,
    /// Connection callback.
    callback: Option<Arc<dyn ConnectionCallback>>,
    /// Channel establishment.
    binder: Option<Arc<dyn TransportBinder>>,
    /// Runtime for the event loop.
    runtime: Option<Handle>,
}

impl fmt::Debug for MediaBrowserBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaBrowserBuilder")
            .field("component", &self.component)
            .field("client_name", &self.client_name)
            .field("root_hints", &self.root_hints)
            .field("has_callback", &self.callback.is_some())
            .field("has_binder", &self.binder.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// MediaBrowserBuilder Implementation
// ============================================================================

impl MediaBrowserBuilder {
    /// Creates a new builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the provider service to bind.
    #[inline]
    #[must_use]
    pub fn component(mut self, component: ServiceComponent) -> Self {
        self.component = Some(component);
        self
    }

    /// Sets the client identity sent to the provider.
    ///
    /// Defaults to the crate name.
    #[inline]
    #[must_use]
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Sets hints the provider may use when choosing the root.
    #[inline]
    #[must_use]
    pub fn root_hints(mut self, hints: BrowseOptions) -> Self {
        self.root_hints = Some(hints);
        self
    }

    /// Sets the connection callback.
    #[inline]
    #[must_use]
    pub fn callback(mut self, callback: Arc<dyn ConnectionCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Sets the transport binder.
    #[inline]
    #[must_use]
    pub fn binder(mut self, binder: Arc<dyn TransportBinder>) -> Self {
        self.binder = Some(binder);
        self
    }

    /// Sets the runtime the event loop runs on.
    ///
    /// Defaults to the runtime `build()` is called from.
    #[inline]
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds the browser and starts its event loop.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the component, callback or binder is missing
    /// - [`Error::Config`] if no runtime was given and none is running
    /// - [`Error::Config`] if the client name is empty
    pub fn build(self) -> Result<MediaBrowser> {
        let component = self
            .component
            .ok_or_else(|| Error::config("service component is required"))?;
        let callback = self
            .callback
            .ok_or_else(|| Error::config("connection callback is required"))?;
        let binder = self
            .binder
            .ok_or_else(|| Error::config("transport binder is required"))?;

        let client_name = self
            .client_name
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned());
        if client_name.is_empty() {
            return Err(Error::config("client name must not be empty"));
        }

        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current()
                .map_err(|e| Error::config(format!("no tokio runtime available: {e}")))?,
        };

        Ok(MediaBrowser::spawn(
            component,
            client_name,
            self.root_hints,
            callback,
            binder,
            runtime,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
