//! Hyper-based HTTP transport channel.
//!
//! [`HttpChannelProvider`] is the default instantiating transport of
//! generated clients. It starts out needing an executor, headers and an
//! endpoint; once those are injected, [`transport_channel`] builds a pooled
//! hyper_util legacy client that spawns its connection tasks on the injected
//! executor. No connection is opened until the first request.
//!
//! [`transport_channel`]: TransportChannelProvider::transport_channel

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use bytes::Bytes;
use http::HeaderMap;
use http_body_util::Full;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioTimer;
use rpc_settings_core::{
    Credentials, Executor, ProviderError, TransportChannel, TransportChannelProvider,
};
use tokio::runtime::Handle;

/// Type alias for the pooled hyper client.
pub type HttpClient = Client<HttpConnector, Full<Bytes>>;

const TRANSPORT_NAME: &str = "http";

/// Default connection pool settings.
pub mod defaults {
    use std::time::Duration;

    /// Default for HTTP/2 prior knowledge.
    pub const HTTP2_ONLY: bool = false;

    /// Default idle timeout of pooled connections.
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Default maximum number of idle connections per host.
    pub const POOL_MAX_IDLE_PER_HOST: usize = 32;
}

/// Spawns hyper's background tasks on a runtime handle.
#[derive(Clone)]
struct HandleExecutor(Handle);

impl<F> hyper::rt::Executor<F> for HandleExecutor
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    fn execute(&self, future: F) {
        self.0.spawn(future);
    }
}

/// Transport channel provider backed by hyper.
///
/// # Example
///
/// ```ignore
/// use rpc_settings::{ClientSettingsBuilder, SettingsBuilder};
/// use rpc_settings::transport::HttpChannelProvider;
/// use std::time::Duration;
///
/// let settings = ClientSettingsBuilder::new()
///     .transport_channel_provider(
///         HttpChannelProvider::builder()
///             .http2_only(true)
///             .pool_idle_timeout(Duration::from_secs(60))
///             .build(),
///     )
///     .endpoint("http://localhost:3000")
///     .build()?;
/// ```
#[derive(Clone, Debug)]
pub struct HttpChannelProvider {
    http2_only: bool,
    pool_idle_timeout: Option<Duration>,
    pool_max_idle_per_host: usize,
    executor: Option<Executor>,
    headers: Option<HeaderMap>,
    endpoint: Option<String>,
    credentials: Option<Arc<dyn Credentials>>,
}

impl Default for HttpChannelProvider {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl HttpChannelProvider {
    /// Create a new provider builder.
    pub fn builder() -> HttpChannelProviderBuilder {
        HttpChannelProviderBuilder::new()
    }

    /// Check if this provider is configured for HTTP/2 only.
    pub fn is_http2_only(&self) -> bool {
        self.http2_only
    }

    /// The injected endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn build_client(&self, executor: &Executor) -> HttpClient {
        let mut builder = Client::builder(HandleExecutor(executor.handle().clone()));

        // Configure connection pool timer (required for pool_idle_timeout to work)
        builder.pool_timer(TokioTimer::new());

        if let Some(timeout) = self.pool_idle_timeout {
            builder.pool_idle_timeout(timeout);
        }
        builder.pool_max_idle_per_host(self.pool_max_idle_per_host);

        if self.http2_only {
            builder.http2_only(true);
        }

        builder.build(HttpConnector::new())
    }
}

impl TransportChannelProvider for HttpChannelProvider {
    fn should_auto_close(&self) -> bool {
        true
    }

    fn needs_executor(&self) -> bool {
        self.executor.is_none()
    }

    fn with_executor(
        &self,
        executor: Executor,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError> {
        Ok(Arc::new(Self {
            executor: Some(executor),
            ..self.clone()
        }))
    }

    fn needs_headers(&self) -> bool {
        self.headers.is_none()
    }

    fn with_headers(
        &self,
        headers: HeaderMap,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError> {
        Ok(Arc::new(Self {
            headers: Some(headers),
            ..self.clone()
        }))
    }

    fn needs_endpoint(&self) -> bool {
        self.endpoint.is_none()
    }

    fn with_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError> {
        Ok(Arc::new(Self {
            endpoint: Some(endpoint.to_string()),
            ..self.clone()
        }))
    }

    fn needs_credentials(&self) -> bool {
        false
    }

    fn with_credentials(
        &self,
        credentials: Arc<dyn Credentials>,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError> {
        Ok(Arc::new(Self {
            credentials: Some(credentials),
            ..self.clone()
        }))
    }

    /// Build a channel.
    ///
    /// Falls back to the current tokio runtime when no executor was
    /// injected.
    fn transport_channel(&self) -> Result<Arc<dyn TransportChannel>, ProviderError> {
        let endpoint = self.endpoint.clone().ok_or(ProviderError::MissingEndpoint)?;
        let executor = match &self.executor {
            Some(executor) => executor.clone(),
            None => Executor::current()?,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            endpoint = %endpoint,
            http2_only = self.http2_only,
            pool_max_idle_per_host = self.pool_max_idle_per_host,
            "creating http transport channel"
        );

        Ok(Arc::new(HttpChannel {
            client: RwLock::new(Some(self.build_client(&executor))),
            executor,
            endpoint,
            headers: self.headers.clone().unwrap_or_default(),
            credentials: self.credentials.clone(),
            http2_only: self.http2_only,
            shutdown: AtomicBool::new(false),
        }))
    }

    fn transport_name(&self) -> &str {
        TRANSPORT_NAME
    }
}

/// Builder for [`HttpChannelProvider`].
#[derive(Debug)]
pub struct HttpChannelProviderBuilder {
    /// Force HTTP/2 only (for h2c or when HTTP/2 is required).
    http2_only: bool,
    /// Connection pool idle timeout.
    pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host.
    pool_max_idle_per_host: usize,
}

impl Default for HttpChannelProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpChannelProviderBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            http2_only: defaults::HTTP2_ONLY,
            pool_idle_timeout: Some(defaults::POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: defaults::POOL_MAX_IDLE_PER_HOST,
        }
    }

    /// Enable HTTP/2 only mode.
    ///
    /// When enabled, the channel speaks HTTP/2 directly without the HTTP/1.1
    /// upgrade handshake (h2c prior knowledge).
    pub fn http2_only(mut self, enabled: bool) -> Self {
        self.http2_only = enabled;
        self
    }

    /// Set the connection pool idle timeout.
    ///
    /// Default: 90 seconds.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Disable connection pool idle timeout.
    pub fn pool_idle_timeout_none(mut self) -> Self {
        self.pool_idle_timeout = None;
        self
    }

    /// Set the maximum number of idle connections per host.
    ///
    /// Default: 32.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Build the provider. Nothing is injected yet.
    pub fn build(self) -> HttpChannelProvider {
        HttpChannelProvider {
            http2_only: self.http2_only,
            pool_idle_timeout: self.pool_idle_timeout,
            pool_max_idle_per_host: self.pool_max_idle_per_host,
            executor: None,
            headers: None,
            endpoint: None,
            credentials: None,
        }
    }
}

/// A pooled HTTP channel to one endpoint.
pub struct HttpChannel {
    client: RwLock<Option<HttpClient>>,
    executor: Executor,
    endpoint: String,
    headers: HeaderMap,
    credentials: Option<Arc<dyn Credentials>>,
    http2_only: bool,
    shutdown: AtomicBool,
}

impl HttpChannel {
    /// The pooled client, or `None` after shutdown.
    pub fn client(&self) -> Option<HttpClient> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The executor connection tasks are spawned on.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Headers attached to every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn credentials(&self) -> Option<&Arc<dyn Credentials>> {
        self.credentials.as_ref()
    }

    pub fn is_http2_only(&self) -> bool {
        self.http2_only
    }

    /// The static headers followed by the credentials' request metadata.
    pub fn request_headers(&self) -> Result<HeaderMap, ProviderError> {
        let mut headers = self.headers.clone();
        if let Some(credentials) = &self.credentials {
            headers.extend(credentials.request_metadata()?);
        }
        Ok(headers)
    }
}

impl std::fmt::Debug for HttpChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChannel")
            .field("endpoint", &self.endpoint)
            .field("http2_only", &self.http2_only)
            .field("shutdown", &self.is_shutdown())
            .finish_non_exhaustive()
    }
}

impl TransportChannel for HttpChannel {
    fn transport_name(&self) -> &str {
        TRANSPORT_NAME
    }

    /// Drop the pooled client. Idle connections close once in-flight
    /// requests holding a clone of the client finish.
    fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}
