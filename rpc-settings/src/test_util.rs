//! In-memory providers shared by unit tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use http::HeaderMap;
use rpc_settings_core::{
    Clock, Credentials, Executor, ProviderError, TransportChannel, TransportChannelProvider,
};

#[derive(Debug, Default)]
pub(crate) struct LoopbackChannel {
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

/// Values injected into a [`LoopbackChannelProvider`].
#[derive(Debug, Default)]
pub(crate) struct Injected {
    pub(crate) executor: Option<Executor>,
    pub(crate) headers: Option<HeaderMap>,
    pub(crate) endpoint: Option<String>,
    pub(crate) credentials: Option<Arc<dyn Credentials>>,
}

/// Provider that records what it is given and hands out one shared channel.
///
/// Injected values are recorded in a shared slot so tests can inspect them
/// after the provider has been replaced by its `with_*` result.
#[derive(Clone, Debug, Default)]
pub(crate) struct LoopbackChannelProvider {
    pub(crate) channel: Arc<LoopbackChannel>,
    pub(crate) injected: Arc<Mutex<Injected>>,
    pub(crate) needs_executor: bool,
    pub(crate) needs_headers: bool,
    pub(crate) needs_endpoint: bool,
    pub(crate) needs_credentials: bool,
    pub(crate) auto_close: bool,
}

impl LoopbackChannelProvider {
    /// A provider that needs everything injected and is closed by its client.
    pub(crate) fn needing_all() -> Self {
        Self {
            needs_executor: true,
            needs_headers: true,
            needs_endpoint: true,
            needs_credentials: true,
            auto_close: true,
            ..Self::default()
        }
    }

    fn record(
        &self,
        f: impl FnOnce(&mut Injected),
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError> {
        f(&mut self.injected.lock().unwrap());
        Ok(Arc::new(self.clone()))
    }
}

impl TransportChannelProvider for LoopbackChannelProvider {
    fn should_auto_close(&self) -> bool {
        self.auto_close
    }

    fn needs_executor(&self) -> bool {
        self.needs_executor
    }

    fn with_executor(
        &self,
        executor: Executor,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError> {
        self.record(|i| i.executor = Some(executor))
    }

    fn needs_headers(&self) -> bool {
        self.needs_headers
    }

    fn with_headers(
        &self,
        headers: HeaderMap,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError> {
        self.record(|i| i.headers = Some(headers))
    }

    fn needs_endpoint(&self) -> bool {
        self.needs_endpoint
    }

    fn with_endpoint(
        &self,
        endpoint: &str,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError> {
        self.record(|i| i.endpoint = Some(endpoint.to_string()))
    }

    fn needs_credentials(&self) -> bool {
        self.needs_credentials
    }

    fn with_credentials(
        &self,
        credentials: Arc<dyn Credentials>,
    ) -> Result<Arc<dyn TransportChannelProvider>, ProviderError> {
        self.record(|i| i.credentials = Some(credentials))
    }

    fn transport_channel(&self) -> Result<Arc<dyn TransportChannel>, ProviderError> {
        Ok(self.channel.clone())
    }

    fn transport_name(&self) -> &str {
        "loopback"
    }
}

/// Clock frozen at zero.
#[derive(Debug, Default)]
pub(crate) struct ManualClock {
    nanos: AtomicU64,
}

impl Clock for ManualClock {
    fn nano_time(&self) -> u64 {
        self.nanos.load(Ordering::SeqCst)
    }

    fn millis_time(&self) -> u64 {
        self.nano_time() / 1_000_000
    }
}
