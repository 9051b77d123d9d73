//! Resolved runtime state of a client.
//!
//! Settings hold *providers*. A [`RuntimeContext`] holds what those providers
//! produced when a client was created: a live executor, a transport channel,
//! credentials and header maps. It is also the input to
//! [`ClientSettingsBuilder::from_context`](crate::ClientSettingsBuilder::from_context),
//! which freezes these live values back into fixed providers.

use std::fmt;
use std::sync::Arc;

use http::HeaderMap;
use rpc_settings_core::{
    Clock, Credentials, Executor, ProviderError, SystemClock, TransportChannel,
    TransportChannelProvider,
};

use crate::error::BuildError;
use crate::settings::ClientSettings;

/// Live values a client runs with.
#[derive(Clone)]
pub struct RuntimeContext {
    executor: Executor,
    transport_channel: Arc<dyn TransportChannel>,
    credentials: Option<Arc<dyn Credentials>>,
    headers: HeaderMap,
    internal_headers: HeaderMap,
    clock: Arc<dyn Clock>,
    endpoint: Option<String>,
    owns_transport_channel: bool,
}

impl RuntimeContext {
    /// Start assembling a context around an executor and a channel.
    ///
    /// The remaining fields default to no credentials, empty headers,
    /// [`SystemClock::shared`] and no endpoint. The channel is not owned.
    pub fn builder(
        executor: Executor,
        transport_channel: Arc<dyn TransportChannel>,
    ) -> RuntimeContextBuilder {
        RuntimeContextBuilder {
            context: RuntimeContext {
                executor,
                transport_channel,
                credentials: None,
                headers: HeaderMap::new(),
                internal_headers: HeaderMap::new(),
                clock: SystemClock::shared(),
                endpoint: None,
                owns_transport_channel: false,
            },
        }
    }

    /// Resolve every provider in `settings`.
    ///
    /// The executor, credentials and both header sets are obtained first.
    /// They are then injected into the transport channel provider for each
    /// value it reports needing, and the channel is requested last.
    ///
    /// # Errors
    ///
    /// - [`BuildError::MissingExecutorProvider`] if the executor provider was
    ///   cleared
    /// - [`BuildError::DuplicateHeader`] if a user header collides with an
    ///   internal header
    /// - [`BuildError::Provider`] if any provider fails, including a transport
    ///   that needs an endpoint when none is set
    pub fn create(settings: &ClientSettings) -> Result<Self, BuildError> {
        let executor = settings
            .executor_provider()
            .ok_or(BuildError::MissingExecutorProvider)?
            .executor()?;
        let credentials = settings.credentials_provider().credentials()?;
        let headers = settings.header_provider().headers();
        let internal_headers = settings.internal_header_provider().headers();

        let merged = merge_headers(&headers, &internal_headers)?;

        let mut provider: Arc<dyn TransportChannelProvider> =
            settings.transport_channel_provider().clone();
        if provider.needs_executor() {
            provider = provider.with_executor(executor.clone())?;
        }
        if provider.needs_headers() {
            provider = provider.with_headers(merged)?;
        }
        if provider.needs_endpoint() {
            let endpoint = settings
                .endpoint()
                .ok_or(ProviderError::MissingEndpoint)?;
            provider = provider.with_endpoint(endpoint)?;
        }
        if provider.needs_credentials() {
            if let Some(credentials) = &credentials {
                provider = provider.with_credentials(credentials.clone())?;
            }
        }

        let transport_channel = provider.transport_channel()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            transport = transport_channel.transport_name(),
            endpoint = ?settings.endpoint(),
            owned = provider.should_auto_close(),
            authenticated = credentials.is_some(),
            "created runtime context"
        );

        Ok(Self {
            executor,
            transport_channel,
            credentials,
            headers,
            internal_headers,
            clock: settings.clock().clone(),
            endpoint: settings.endpoint().map(String::from),
            owns_transport_channel: provider.should_auto_close(),
        })
    }

    /// The executor for async call logic.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// The channel calls are sent through.
    pub fn transport_channel(&self) -> &Arc<dyn TransportChannel> {
        &self.transport_channel
    }

    /// Credentials calls are made with, if any.
    pub fn credentials(&self) -> Option<&Arc<dyn Credentials>> {
        self.credentials.as_ref()
    }

    /// Custom headers supplied by the user.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Headers supplied by the client library.
    pub fn internal_headers(&self) -> &HeaderMap {
        &self.internal_headers
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Whether [`close`](Self::close) shuts the transport channel down.
    pub fn owns_transport_channel(&self) -> bool {
        self.owns_transport_channel
    }

    /// Release the resources this context owns.
    ///
    /// Shuts the transport channel down if it was created for this context.
    /// An owned executor shuts down when the last clone of it is dropped.
    pub fn close(&self) {
        if self.owns_transport_channel {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                transport = self.transport_channel.transport_name(),
                "shutting down owned transport channel"
            );
            self.transport_channel.shutdown();
        }
    }
}

impl fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("executor", &self.executor)
            .field("transport_channel", &self.transport_channel)
            .field("credentials", &self.credentials)
            .field("headers", &self.headers)
            .field("internal_headers", &self.internal_headers)
            .field("clock", &self.clock)
            .field("endpoint", &self.endpoint)
            .field("owns_transport_channel", &self.owns_transport_channel)
            .finish()
    }
}

/// Builder for a [`RuntimeContext`] assembled by hand.
#[derive(Debug)]
pub struct RuntimeContextBuilder {
    context: RuntimeContext,
}

impl RuntimeContextBuilder {
    pub fn credentials<C: Credentials + 'static>(mut self, credentials: C) -> Self {
        self.context.credentials = Some(Arc::new(credentials));
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.context.headers = headers;
        self
    }

    pub fn internal_headers(mut self, headers: HeaderMap) -> Self {
        self.context.internal_headers = headers;
        self
    }

    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.context.clock = Arc::new(clock);
        self
    }

    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.context.endpoint = Some(endpoint.into());
        self
    }

    /// Mark the channel as owned, so [`RuntimeContext::close`] shuts it down.
    pub fn owns_transport_channel(mut self, owned: bool) -> Self {
        self.context.owns_transport_channel = owned;
        self
    }

    pub fn build(self) -> RuntimeContext {
        self.context
    }
}

/// Combine user and internal headers, rejecting names present in both.
fn merge_headers(user: &HeaderMap, internal: &HeaderMap) -> Result<HeaderMap, BuildError> {
    if let Some(name) = user.keys().find(|name| internal.contains_key(*name)) {
        return Err(BuildError::DuplicateHeader(name.to_string()));
    }
    let mut merged = user.clone();
    for (name, value) in internal {
        merged.append(name, value.clone());
    }
    Ok(merged)
}
