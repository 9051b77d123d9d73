//! Finalized client settings.
//!
//! [`ClientSettings`] is the configuration shared by every service client:
//! executor, credentials, headers, transport, clock and endpoint. Per-service
//! settings embed a `ClientSettings` next to their method-level call settings
//! and implement [`Settings`] so they can be turned back into their own
//! builder.

use std::fmt;
use std::sync::Arc;

use rpc_settings_core::{
    Clock, CredentialsProvider, ExecutorProvider, HeaderProvider, TransportChannelProvider,
};

use crate::builder::{ClientSettingsBuilder, SettingsBuilder};

/// Implemented by every finalized settings type.
pub trait Settings: Sized {
    /// The builder that produces this settings type.
    type Builder: SettingsBuilder<Settings = Self>;

    /// The embedded client-wide settings.
    fn client_settings(&self) -> &ClientSettings;

    /// A builder pre-populated with these settings.
    fn to_builder(&self) -> Self::Builder;
}

/// Immutable client-wide settings.
///
/// Created by [`ClientSettingsBuilder::build`]. Cloning copies provider
/// references, never the providers themselves.
///
/// # Example
///
/// ```ignore
/// use rpc_settings::{ClientSettingsBuilder, SettingsBuilder};
///
/// let settings = ClientSettingsBuilder::new()
///     .transport_channel_provider(HttpChannelProvider::default())
///     .endpoint("localhost:3000")
///     .build()?;
///
/// // Copy, tweak one field, rebuild.
/// let staging = settings.to_builder().endpoint("staging:3000").build()?;
/// ```
#[derive(Clone)]
pub struct ClientSettings {
    executor_provider: Option<Arc<dyn ExecutorProvider>>,
    credentials_provider: Arc<dyn CredentialsProvider>,
    header_provider: Arc<dyn HeaderProvider>,
    internal_header_provider: Arc<dyn HeaderProvider>,
    transport_channel_provider: Arc<dyn TransportChannelProvider>,
    clock: Arc<dyn Clock>,
    endpoint: Option<String>,
}

impl ClientSettings {
    /// Snapshot the staged values of `builder`.
    pub(crate) fn new(
        builder: &ClientSettingsBuilder,
        transport_channel_provider: Arc<dyn TransportChannelProvider>,
    ) -> Self {
        Self {
            executor_provider: builder.executor_provider.clone(),
            credentials_provider: builder.credentials_provider.clone(),
            header_provider: builder.header_provider.clone(),
            internal_header_provider: builder.internal_header_provider.clone(),
            transport_channel_provider,
            clock: builder.clock.clone(),
            endpoint: builder.endpoint.clone(),
        }
    }

    /// Provider of the executor used for async call bookkeeping.
    ///
    /// `None` only if a caller explicitly cleared it.
    pub fn executor_provider(&self) -> Option<&Arc<dyn ExecutorProvider>> {
        self.executor_provider.as_ref()
    }

    /// Provider of the credentials calls are made with.
    pub fn credentials_provider(&self) -> &Arc<dyn CredentialsProvider> {
        &self.credentials_provider
    }

    /// Provider of custom static headers.
    pub fn header_provider(&self) -> &Arc<dyn HeaderProvider> {
        &self.header_provider
    }

    pub(crate) fn internal_header_provider(&self) -> &Arc<dyn HeaderProvider> {
        &self.internal_header_provider
    }

    /// Provider of the transport channel.
    pub fn transport_channel_provider(&self) -> &Arc<dyn TransportChannelProvider> {
        &self.transport_channel_provider
    }

    /// Clock used by retry logic.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Address of the target service, if one was configured.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// A builder pre-populated with every field of these settings.
    pub fn to_builder(&self) -> ClientSettingsBuilder {
        ClientSettingsBuilder::from_settings(self)
    }
}

impl Settings for ClientSettings {
    type Builder = ClientSettingsBuilder;

    fn client_settings(&self) -> &ClientSettings {
        self
    }

    fn to_builder(&self) -> ClientSettingsBuilder {
        ClientSettings::to_builder(self)
    }
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("executor_provider", &self.executor_provider)
            .field("transport_channel_provider", &self.transport_channel_provider)
            .field("credentials_provider", &self.credentials_provider)
            .field("header_provider", &self.header_provider)
            .field("internal_header_provider", &self.internal_header_provider)
            .field("clock", &self.clock)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::InternalHeaders;
    use crate::test_util::LoopbackChannelProvider;
    use rpc_settings_core::{FixedHeaderProvider, SystemClock};

    fn settings() -> ClientSettings {
        ClientSettingsBuilder::new()
            .transport_channel_provider(LoopbackChannelProvider::default())
            .header_provider(FixedHeaderProvider::try_from_pairs([("x-user", "1")]).unwrap())
            .endpoint("localhost:3000")
            .build()
            .unwrap()
    }

    fn assert_same_fields(a: &ClientSettings, b: &ClientSettings) {
        match (a.executor_provider(), b.executor_provider()) {
            (Some(x), Some(y)) => assert!(Arc::ptr_eq(x, y)),
            (None, None) => {}
            _ => panic!("executor providers differ"),
        }
        assert!(Arc::ptr_eq(a.credentials_provider(), b.credentials_provider()));
        assert!(Arc::ptr_eq(a.header_provider(), b.header_provider()));
        assert!(Arc::ptr_eq(
            a.get_internal_header_provider(),
            b.get_internal_header_provider()
        ));
        assert!(Arc::ptr_eq(
            a.transport_channel_provider(),
            b.transport_channel_provider()
        ));
        assert!(Arc::ptr_eq(a.clock(), b.clock()));
        assert_eq!(a.endpoint(), b.endpoint());
    }

    #[test]
    fn test_to_builder_round_trip() {
        let original = settings();
        let rebuilt = original.to_builder().build().unwrap();
        assert_same_fields(&original, &rebuilt);
    }

    #[test]
    fn test_round_trip_with_cleared_executor() {
        let mut builder = settings().to_builder();
        builder.set_executor_provider(None);
        let original = builder.build().unwrap();

        let rebuilt = original.to_builder().build().unwrap();
        assert!(rebuilt.executor_provider().is_none());
        assert_same_fields(&original, &rebuilt);
    }

    #[test]
    fn test_to_builder_tweak_one_field() {
        let original = settings();
        let tweaked = original.to_builder().endpoint("staging:3000").build().unwrap();

        assert_eq!(original.endpoint(), Some("localhost:3000"));
        assert_eq!(tweaked.endpoint(), Some("staging:3000"));
        assert!(Arc::ptr_eq(original.header_provider(), tweaked.header_provider()));
        assert!(Arc::ptr_eq(original.clock(), tweaked.clock()));
    }

    #[test]
    fn test_debug_lists_all_fields() {
        let dump = format!("{:?}", settings());
        for field in [
            "executor_provider",
            "transport_channel_provider",
            "credentials_provider",
            "header_provider",
            "internal_header_provider",
            "clock",
            "endpoint",
        ] {
            assert!(dump.contains(field), "missing {field} in {dump}");
        }
        assert!(dump.contains("InstantiatingExecutorProvider"));
        assert!(dump.contains("LoopbackChannelProvider"));
        assert!(dump.contains("NoCredentialsProvider"));
        assert!(dump.contains("NoHeaderProvider"));
        assert!(dump.contains("SystemClock"));
        assert!(dump.contains("localhost:3000"));
    }

    #[test]
    fn test_debug_shows_unset_endpoint() {
        let settings = ClientSettingsBuilder::new()
            .transport_channel_provider(LoopbackChannelProvider::default())
            .build()
            .unwrap();
        assert!(format!("{settings:?}").contains("endpoint: None"));
    }

    #[test]
    fn test_settings_trait_to_builder() {
        fn rebuild<S: Settings>(settings: &S) -> S {
            settings.to_builder().build().unwrap()
        }

        let original = settings();
        assert_same_fields(&original, &rebuild(&original));
        assert_same_fields(&original, Settings::client_settings(&original));
    }

    #[test]
    fn test_settings_are_shareable_across_threads() {
        let settings = Arc::new(settings());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let settings = settings.clone();
                std::thread::spawn(move || settings.endpoint().map(String::from))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().as_deref(), Some("localhost:3000"));
        }
    }

    #[test]
    fn test_defaults_survive_build() {
        let settings = settings();
        assert!(
            settings
                .credentials_provider()
                .credentials()
                .unwrap()
                .is_none()
        );
        let clock: Arc<dyn Clock> = SystemClock::shared();
        assert!(Arc::ptr_eq(settings.clock(), &clock));
    }
}
