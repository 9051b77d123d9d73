//! Builders for client settings.
//!
//! [`ClientSettingsBuilder`] stages the client-wide fields. Per-service
//! builders embed one and implement [`SettingsBuilder`], which gives them the
//! fluent client-wide setters with their own type as the return type:
//!
//! ```ignore
//! use rpc_settings::{SettingsBuilder, NoCredentialsProvider};
//!
//! // `EchoSettingsBuilder` embeds a `ClientSettingsBuilder`.
//! let settings: EchoSettings = EchoSettingsBuilder::new()
//!     .endpoint("localhost:3000")          // still an EchoSettingsBuilder
//!     .credentials_provider(NoCredentialsProvider)
//!     .echo_timeout(Duration::from_secs(5)) // per-service setter
//!     .build()?;
//! ```

use std::fmt;
use std::sync::Arc;

use rpc_settings_core::{
    Clock, CredentialsProvider, ExecutorProvider, FixedCredentialsProvider, FixedExecutorProvider,
    FixedHeaderProvider, FixedTransportChannelProvider, HeaderProvider,
    InstantiatingExecutorProvider, NoCredentialsProvider, NoHeaderProvider, SystemClock,
    TransportChannelProvider,
};

use crate::config::UnaryCallSettingsBuilder;
use crate::context::RuntimeContext;
use crate::error::{BuildError, SettingsError};
use crate::settings::ClientSettings;

/// Implemented by every settings builder.
///
/// Implementors expose their embedded [`ClientSettingsBuilder`] and their own
/// finalization. The provided methods stage client-wide fields and return
/// `Self`, so chained calls keep the implementor's concrete type.
pub trait SettingsBuilder: Sized {
    /// The settings type produced by [`build`](SettingsBuilder::build).
    type Settings;

    /// The embedded client-wide builder.
    fn client_settings(&self) -> &ClientSettingsBuilder;

    /// The embedded client-wide builder, mutably.
    fn client_settings_mut(&mut self) -> &mut ClientSettingsBuilder;

    /// Finalize the staged values.
    ///
    /// Implementations may fill in their own defaults (for example a default
    /// transport) before building the embedded [`ClientSettingsBuilder`].
    /// The builder stays usable afterwards; every call yields an independent
    /// snapshot.
    fn build(&self) -> Result<Self::Settings, BuildError>;

    /// Set the provider of the executor used for async call logic (retries,
    /// long-running operations), which is also handed to transports that
    /// need one.
    fn executor_provider<P: ExecutorProvider + 'static>(mut self, provider: P) -> Self {
        self.client_settings_mut()
            .set_executor_provider(Some(Arc::new(provider)));
        self
    }

    /// Set the provider of the credentials calls are made with.
    fn credentials_provider<P: CredentialsProvider + 'static>(mut self, provider: P) -> Self {
        self.client_settings_mut().credentials_provider = Arc::new(provider);
        self
    }

    /// Set the provider of custom static headers.
    ///
    /// The provider is called once when a client is created; its headers are
    /// attached to every request the client sends.
    fn header_provider<P: HeaderProvider + 'static>(mut self, provider: P) -> Self {
        self.client_settings_mut()
            .set_header_provider(Arc::new(provider));
        self
    }

    /// Set the provider of the transport channel calls are sent through.
    fn transport_channel_provider<P: TransportChannelProvider + 'static>(
        mut self,
        provider: P,
    ) -> Self {
        self.client_settings_mut()
            .set_transport_channel_provider(Some(Arc::new(provider)));
        self
    }

    /// Set the clock used by retry logic.
    fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.client_settings_mut().set_clock(Arc::new(clock));
        self
    }

    /// Set the address of the target service.
    fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.client_settings_mut()
            .set_endpoint(Some(endpoint.into()));
        self
    }
}

/// Mutable staging area for [`ClientSettings`].
///
/// # Construction
///
/// - [`new`](Self::new) / [`Default`]: library defaults (same as
///   `from_context(None)`)
/// - [`from_context`](Self::from_context): freeze a running client's resolved
///   values into fixed providers
/// - [`from_settings`](Self::from_settings): copy existing settings
#[derive(Clone)]
pub struct ClientSettingsBuilder {
    pub(crate) executor_provider: Option<Arc<dyn ExecutorProvider>>,
    pub(crate) credentials_provider: Arc<dyn CredentialsProvider>,
    pub(crate) header_provider: Arc<dyn HeaderProvider>,
    pub(crate) internal_header_provider: Arc<dyn HeaderProvider>,
    pub(crate) transport_channel_provider: Option<Arc<dyn TransportChannelProvider>>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) endpoint: Option<String>,
}

impl Default for ClientSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSettingsBuilder {
    /// Create a builder with library defaults.
    ///
    /// - executor: [`InstantiatingExecutorProvider`] with default settings
    /// - transport channel: unset
    /// - credentials: [`NoCredentialsProvider`]
    /// - headers and internal headers: [`NoHeaderProvider`]
    /// - clock: [`SystemClock::shared`]
    /// - endpoint: unset
    pub fn new() -> Self {
        Self::from_context(None)
    }

    /// Create a builder from a running client's resolved context.
    ///
    /// With a context, each live value is frozen into its fixed provider:
    /// the executor, transport channel, credentials and both header maps are
    /// wrapped as-is, and the clock and endpoint are copied. Without one,
    /// this is [`new`](Self::new).
    pub fn from_context(context: Option<&RuntimeContext>) -> Self {
        let Some(context) = context else {
            return Self {
                executor_provider: Some(Arc::new(InstantiatingExecutorProvider::default())),
                credentials_provider: Arc::new(NoCredentialsProvider),
                header_provider: Arc::new(NoHeaderProvider),
                internal_header_provider: Arc::new(NoHeaderProvider),
                transport_channel_provider: None,
                clock: SystemClock::shared(),
                endpoint: None,
            };
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            endpoint = ?context.endpoint(),
            transport = context.transport_channel().transport_name(),
            "deriving client settings from runtime context"
        );

        Self {
            executor_provider: Some(Arc::new(FixedExecutorProvider::new(
                context.executor().clone(),
            ))),
            credentials_provider: Arc::new(FixedCredentialsProvider::from_shared(
                context.credentials().cloned(),
            )),
            header_provider: Arc::new(FixedHeaderProvider::new(context.headers().clone())),
            internal_header_provider: Arc::new(FixedHeaderProvider::new(
                context.internal_headers().clone(),
            )),
            transport_channel_provider: Some(Arc::new(
                FixedTransportChannelProvider::from_shared(context.transport_channel().clone()),
            )),
            clock: context.clock().clone(),
            endpoint: context.endpoint().map(String::from),
        }
    }

    /// Create a builder holding exactly the fields of `settings`.
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            executor_provider: settings.executor_provider().cloned(),
            credentials_provider: settings.credentials_provider().clone(),
            header_provider: settings.header_provider().clone(),
            internal_header_provider: settings.internal_header_provider().clone(),
            transport_channel_provider: Some(settings.transport_channel_provider().clone()),
            clock: settings.clock().clone(),
            endpoint: settings.endpoint().map(String::from),
        }
    }

    /// Set or clear the executor provider.
    ///
    /// Clearing it is allowed; creating a runtime context from the resulting
    /// settings then fails with [`BuildError::MissingExecutorProvider`].
    pub fn set_executor_provider(
        &mut self,
        provider: Option<Arc<dyn ExecutorProvider>>,
    ) -> &mut Self {
        self.executor_provider = provider;
        self
    }

    /// Set the credentials provider.
    ///
    /// # Errors
    ///
    /// `None` is rejected with [`SettingsError::NullCredentialsProvider`] and
    /// the staged provider is left unchanged. Use [`NoCredentialsProvider`]
    /// to make calls without credentials.
    pub fn set_credentials_provider(
        &mut self,
        provider: Option<Arc<dyn CredentialsProvider>>,
    ) -> Result<&mut Self, SettingsError> {
        let provider = provider.ok_or(SettingsError::NullCredentialsProvider)?;
        self.credentials_provider = provider;
        Ok(self)
    }

    /// Set the custom header provider.
    pub fn set_header_provider(&mut self, provider: Arc<dyn HeaderProvider>) -> &mut Self {
        self.header_provider = provider;
        self
    }

    /// Set or clear the transport channel provider.
    pub fn set_transport_channel_provider(
        &mut self,
        provider: Option<Arc<dyn TransportChannelProvider>>,
    ) -> &mut Self {
        self.transport_channel_provider = provider;
        self
    }

    /// Set the clock used by retry logic.
    pub fn set_clock(&mut self, clock: Arc<dyn Clock>) -> &mut Self {
        self.clock = clock;
        self
    }

    /// Set or clear the endpoint. No format validation is performed.
    pub fn set_endpoint(&mut self, endpoint: Option<String>) -> &mut Self {
        self.endpoint = endpoint;
        self
    }

    /// Get the staged executor provider.
    pub fn get_executor_provider(&self) -> Option<&Arc<dyn ExecutorProvider>> {
        self.executor_provider.as_ref()
    }

    /// Get the staged credentials provider.
    pub fn get_credentials_provider(&self) -> &Arc<dyn CredentialsProvider> {
        &self.credentials_provider
    }

    /// Get the staged custom header provider.
    pub fn get_header_provider(&self) -> &Arc<dyn HeaderProvider> {
        &self.header_provider
    }

    /// Get the staged transport channel provider.
    pub fn get_transport_channel_provider(&self) -> Option<&Arc<dyn TransportChannelProvider>> {
        self.transport_channel_provider.as_ref()
    }

    /// Get the staged clock.
    pub fn get_clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Get the staged endpoint.
    pub fn get_endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Build the settings.
    ///
    /// Every staged field is copied as-is. Per-service builders are expected
    /// to default the transport before calling this.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingTransportChannelProvider`] if no
    /// transport channel provider is staged.
    pub fn build(&self) -> Result<ClientSettings, BuildError> {
        let transport_channel_provider = self
            .transport_channel_provider
            .clone()
            .ok_or(BuildError::MissingTransportChannelProvider)?;
        Ok(ClientSettings::new(self, transport_channel_provider))
    }
}

impl SettingsBuilder for ClientSettingsBuilder {
    type Settings = ClientSettings;

    fn client_settings(&self) -> &ClientSettingsBuilder {
        self
    }

    fn client_settings_mut(&mut self) -> &mut ClientSettingsBuilder {
        self
    }

    fn build(&self) -> Result<ClientSettings, BuildError> {
        ClientSettingsBuilder::build(self)
    }
}

impl fmt::Debug for ClientSettingsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettingsBuilder")
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

/// Apply `settings_updater` to each method settings builder, in order.
///
/// Stops at the first error and returns it. Builders before the failing one
/// keep their update, builders after it are never visited.
///
/// # Example
///
/// ```
/// use rpc_settings::{UnaryCallSettingsBuilder, apply_to_all_unary_methods};
/// use std::time::Duration;
///
/// let mut get = UnaryCallSettingsBuilder::new();
/// let mut list = UnaryCallSettingsBuilder::new();
///
/// apply_to_all_unary_methods([&mut get, &mut list], |method| {
///     method.set_simple_timeout_no_retries(Duration::from_secs(5));
///     Ok::<_, std::convert::Infallible>(())
/// })
/// .unwrap();
///
/// assert_eq!(get.get_timeout(), Some(Duration::from_secs(5)));
/// assert_eq!(list.get_timeout(), Some(Duration::from_secs(5)));
/// ```
pub fn apply_to_all_unary_methods<'a, I, F, E>(
    method_settings_builders: I,
    mut settings_updater: F,
) -> Result<(), E>
where
    I: IntoIterator<Item = &'a mut UnaryCallSettingsBuilder>,
    F: FnMut(&mut UnaryCallSettingsBuilder) -> Result<(), E>,
{
    for settings_builder in method_settings_builders {
        settings_updater(settings_builder)?;
    }
    Ok(())
}
