//! Access to the internal header provider.
//!
//! Generated service clients attach library-identification headers (client
//! library name and version, API client header) through a provider kept apart
//! from the user's custom headers. These traits are meant for generated code
//! and companion libraries; they are sealed so only this crate's settings
//! types implement them.
//!
//! This module is not part of the end-user API and is hidden from the docs.
//! Applications configure headers with `set_header_provider`.

use std::sync::Arc;

use rpc_settings_core::HeaderProvider;

use crate::builder::ClientSettingsBuilder;
use crate::settings::ClientSettings;

mod sealed {
    pub trait Sealed {}

    impl Sealed for crate::settings::ClientSettings {}
    impl Sealed for crate::builder::ClientSettingsBuilder {}
}

/// Read access to the internal header provider.
pub trait InternalHeaders: sealed::Sealed {
    /// The provider of headers set by the client library itself.
    fn get_internal_header_provider(&self) -> &Arc<dyn HeaderProvider>;
}

/// Write access to the internal header provider.
pub trait InternalHeadersBuilder: InternalHeaders {
    /// Replace the internal header provider.
    fn set_internal_header_provider(&mut self, provider: Arc<dyn HeaderProvider>) -> &mut Self;

    /// Replace the internal header provider, consuming and returning the
    /// builder.
    fn internal_header_provider<P: HeaderProvider + 'static>(mut self, provider: P) -> Self
    where
        Self: Sized,
    {
        self.set_internal_header_provider(Arc::new(provider));
        self
    }
}

impl InternalHeaders for ClientSettings {
    fn get_internal_header_provider(&self) -> &Arc<dyn HeaderProvider> {
        self.internal_header_provider()
    }
}

impl InternalHeaders for ClientSettingsBuilder {
    fn get_internal_header_provider(&self) -> &Arc<dyn HeaderProvider> {
        &self.internal_header_provider
    }
}

impl InternalHeadersBuilder for ClientSettingsBuilder {
    fn set_internal_header_provider(&mut self, provider: Arc<dyn HeaderProvider>) -> &mut Self {
        self.internal_header_provider = provider;
        self
    }
}
