//! Transport channels and transport channel providers.
//!
//! A [`TransportChannel`] is the wire-level connection a client sends calls
//! through. Settings hold a [`TransportChannelProvider`], which may need the
//! client's executor, headers, endpoint or credentials injected before it can
//! produce a channel. Injection is functional: every `with_*` call returns a
//! new provider and leaves the original untouched.

use std::fmt;
use std::sync::Arc;

use http::HeaderMap;

use crate::{Credentials, Executor, ProviderError};

/// A transport-level channel.
pub trait TransportChannel: Send + Sync + fmt::Debug {
    /// Name of the transport (e.g. `"http"`).
    fn transport_name(&self) -> &str;

    /// Stop accepting new calls and release pooled connections.
    fn shutdown(&self);

    /// Whether [`shutdown`](TransportChannel::shutdown) has been called.
    fn is_shutdown(&self) -> bool;
}

/// Supplies the transport channel a client sends calls through.
pub trait TransportChannelProvider: Send + Sync + fmt::Debug {
    /// Whether the client that obtained the channel is responsible for
    /// shutting it down.
    fn should_auto_close(&self) -> bool;

    /// Whether an executor must be injected before a channel can be created.
    fn needs_executor(&self) -> bool;

    /// Return a provider that uses `executor`.
    fn with_executor(
        &self,
        executor: Executor,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError>;

    /// Whether headers must be injected before a channel can be created.
    fn needs_headers(&self) -> bool;

    /// Return a provider that attaches `headers` to every call.
    fn with_headers(
        &self,
        headers: HeaderMap,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError>;

    /// Whether an endpoint must be injected before a channel can be created.
    fn needs_endpoint(&self) -> bool;

    /// Return a provider that connects to `endpoint`.
    fn with_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError>;

    /// Whether credentials must be injected before a channel can be created.
    fn needs_credentials(&self) -> bool;

    /// Return a provider that authenticates with `credentials`.
    fn with_credentials(
        &self,
        credentials: Arc<dyn Credentials>,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError>;

    /// Get a channel.
    fn transport_channel(&self) -> Result<Arc<dyn TransportChannel>, ProviderError>;

    /// Name of the transport produced by this provider.
    fn transport_name(&self) -> &str;
}

const FIXED_PROVIDER: &str = "FixedTransportChannelProvider";

/// Transport channel provider that always returns the same channel.
///
/// The channel is already built, so nothing can be injected into it: every
/// `with_*` method fails with [`ProviderError::Unsupported`].
#[derive(Clone, Debug)]
pub struct FixedTransportChannelProvider {
    channel: Arc<dyn TransportChannel>,
}

impl FixedTransportChannelProvider {
    /// Create a provider that always returns `channel`.
    pub fn new<C: TransportChannel + 'static>(channel: C) -> Self {
        Self {
            channel: Arc::new(channel),
        }
    }

    /// Create a provider around an already shared channel.
    pub fn from_shared(channel: Arc<dyn TransportChannel>) -> Self {
        Self { channel }
    }
}

impl TransportChannelProvider for FixedTransportChannelProvider {
    fn should_auto_close(&self) -> bool {
        false
    }

    fn needs_executor(&self) -> bool {
        false
    }

    fn with_executor(
        &self,
        _executor: Executor,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError> {
        Err(ProviderError::unsupported(FIXED_PROVIDER, "with_executor"))
    }

    fn needs_headers(&self) -> bool {
        false
    }

    fn with_headers(
        &self,
        _headers: HeaderMap,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError> {
        Err(ProviderError::unsupported(FIXED_PROVIDER, "with_headers"))
    }

    fn needs_endpoint(&self) -> bool {
        false
    }

    fn with_endpoint(
        &self,
        _endpoint: &str,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError> {
        Err(ProviderError::unsupported(FIXED_PROVIDER, "with_endpoint"))
    }

    fn needs_credentials(&self) -> bool {
        false
    }

    fn with_credentials(
        &self,
        _credentials: Arc<dyn Credentials>,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError> {
        Err(ProviderError::unsupported(FIXED_PROVIDER, "with_credentials"))
    }

    fn transport_channel(&self) -> Result<Arc<dyn TransportChannel>, ProviderError> {
        Ok(self.channel.clone())
    }

    fn transport_name(&self) -> &str {
        self.channel.transport_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Default)]
    struct LoopbackChannel {
        shutdown: AtomicBool,
    }

    impl TransportChannel for LoopbackChannel {
        fn transport_name(&self) -> &str {
            "loopback"
        }

        fn shutdown(&self) {
            self.shutdown.store(true, Ordering::SeqCst);
        }

        fn is_shutdown(&self) -> bool {
            self.shutdown.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_fixed_returns_same_channel() {
        let channel: Arc<dyn TransportChannel> = Arc::new(LoopbackChannel::default());
        let provider = FixedTransportChannelProvider::from_shared(channel.clone());

        assert!(Arc::ptr_eq(&provider.transport_channel().unwrap(), &channel));
        assert_eq!(provider.transport_name(), "loopback");
        assert!(!provider.should_auto_close());
    }

    #[test]
    fn test_fixed_needs_nothing() {
        let provider = FixedTransportChannelProvider::new(LoopbackChannel::default());
        assert!(!provider.needs_executor());
        assert!(!provider.needs_headers());
        assert!(!provider.needs_endpoint());
        assert!(!provider.needs_credentials());
    }

    #[test]
    fn test_fixed_rejects_injection() {
        let provider = FixedTransportChannelProvider::new(LoopbackChannel::default());

        let err = provider.with_endpoint("localhost:443").unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Unsupported {
                operation: "with_endpoint",
                ..
            }
        ));
        assert!(provider.with_headers(HeaderMap::new()).is_err());
        assert!(
            provider
                .with_credentials(Arc::new(crate::BearerTokenCredentials::new("t")))
                .is_err()
        );
    }

    #[test]
    fn test_shutdown_is_visible_through_provider() {
        let provider = FixedTransportChannelProvider::new(LoopbackChannel::default());
        let channel = provider.transport_channel().unwrap();
        channel.shutdown();
        assert!(provider.transport_channel().unwrap().is_shutdown());
    }
}
