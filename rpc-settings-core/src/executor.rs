//! Executors and executor providers.
//!
//! An [`Executor`] is a clonable handle to a tokio runtime used for async
//! call bookkeeping (retries, long-running operation polling, transports
//! that need a runtime). Settings never hold an executor directly; they hold
//! an [`ExecutorProvider`] that hands one out when a client is created.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

use crate::ProviderError;

/// Default values for [`InstantiatingExecutorProvider`].
pub mod defaults {
    /// Prefix for worker thread names. Threads are named `<prefix>-<n>`.
    pub const THREAD_NAME_PREFIX: &str = "rpc-settings";

    /// Lower bound for the default worker thread count.
    pub const MIN_WORKER_THREADS: usize = 4;

    /// Default worker thread count: the available parallelism, but at least
    /// [`MIN_WORKER_THREADS`].
    pub fn worker_threads() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .max(MIN_WORKER_THREADS)
    }
}

/// Handle to a tokio runtime.
///
/// Cloning is cheap and all clones refer to the same runtime. An executor
/// created by [`InstantiatingExecutorProvider`] owns its runtime; the runtime
/// is shut down in the background once the last clone is dropped, which is
/// safe from both sync and async code.
#[derive(Clone)]
pub struct Executor {
    inner: Arc<ExecutorInner>,
}

struct ExecutorInner {
    handle: Handle,
    runtime: Option<Runtime>,
}

impl Drop for ExecutorInner {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl Executor {
    /// Wrap a handle to a runtime owned elsewhere.
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            inner: Arc::new(ExecutorInner {
                handle,
                runtime: None,
            }),
        }
    }

    /// Take ownership of a runtime.
    pub fn from_runtime(runtime: Runtime) -> Self {
        Self {
            inner: Arc::new(ExecutorInner {
                handle: runtime.handle().clone(),
                runtime: Some(runtime),
            }),
        }
    }

    /// Wrap the runtime the caller is currently running on.
    ///
    /// # Errors
    ///
    /// Fails when called outside of a tokio runtime.
    pub fn current() -> Result<Self, ProviderError> {
        let handle = Handle::try_current().map_err(std::io::Error::other)?;
        Ok(Self::from_handle(handle))
    }

    /// Get the underlying runtime handle.
    pub fn handle(&self) -> &Handle {
        &self.inner.handle
    }

    /// Whether this executor owns (and will shut down) its runtime.
    pub fn is_owned(&self) -> bool {
        self.inner.runtime.is_some()
    }

    /// Spawn a future onto this executor.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.inner.handle.spawn(future)
    }

    /// Whether two executors are clones of the same handle.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("owned", &self.is_owned())
            .finish()
    }
}

/// Supplies the executor a client uses for its async bookkeeping.
pub trait ExecutorProvider: Send + Sync + fmt::Debug {
    /// Get an executor.
    fn executor(&self) -> Result<Executor, ProviderError>;

    /// Whether the client that obtained the executor is responsible for
    /// shutting it down.
    fn should_auto_close(&self) -> bool;
}

/// Executor provider that always returns the same executor.
#[derive(Clone, Debug)]
pub struct FixedExecutorProvider {
    executor: Executor,
}

impl FixedExecutorProvider {
    /// Create a provider that always returns `executor`.
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl ExecutorProvider for FixedExecutorProvider {
    fn executor(&self) -> Result<Executor, ProviderError> {
        Ok(self.executor.clone())
    }

    fn should_auto_close(&self) -> bool {
        false
    }
}

/// Executor provider that creates a new multi-threaded runtime on every call
/// to [`executor`](ExecutorProvider::executor).
///
/// # Example
///
/// ```
/// use rpc_settings_core::{ExecutorProvider, InstantiatingExecutorProvider};
///
/// let provider = InstantiatingExecutorProvider::builder()
///     .worker_threads(2)
///     .thread_name_prefix("echo-client")
///     .build();
/// assert!(provider.should_auto_close());
/// ```
#[derive(Clone, Debug)]
pub struct InstantiatingExecutorProvider {
    worker_threads: usize,
    thread_name_prefix: String,
}

impl Default for InstantiatingExecutorProvider {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl InstantiatingExecutorProvider {
    /// Create a new provider builder.
    pub fn builder() -> InstantiatingExecutorProviderBuilder {
        InstantiatingExecutorProviderBuilder::new()
    }

    /// Number of worker threads each created runtime gets.
    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Prefix used to name worker threads.
    pub fn thread_name_prefix(&self) -> &str {
        &self.thread_name_prefix
    }
}

impl ExecutorProvider for InstantiatingExecutorProvider {
    fn executor(&self) -> Result<Executor, ProviderError> {
        let counter = Arc::new(AtomicUsize::new(0));
        let prefix = self.thread_name_prefix.clone();
        let runtime = Builder::new_multi_thread()
            .worker_threads(self.worker_threads)
            .thread_name_fn(move || {
                let n = counter.fetch_add(1, Ordering::Relaxed);
                format!("{prefix}-{n}")
            })
            .enable_all()
            .build()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            worker_threads = self.worker_threads,
            prefix = %self.thread_name_prefix,
            "created executor runtime"
        );

        Ok(Executor::from_runtime(runtime))
    }

    fn should_auto_close(&self) -> bool {
        true
    }
}

/// Builder for [`InstantiatingExecutorProvider`].
#[derive(Clone, Debug)]
pub struct InstantiatingExecutorProviderBuilder {
    worker_threads: usize,
    thread_name_prefix: String,
}

impl Default for InstantiatingExecutorProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InstantiatingExecutorProviderBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            worker_threads: defaults::worker_threads(),
            thread_name_prefix: defaults::THREAD_NAME_PREFIX.to_string(),
        }
    }

    /// Set the number of worker threads.
    ///
    /// # Panics
    ///
    /// Panics if `worker_threads` is zero.
    pub fn worker_threads(mut self, worker_threads: usize) -> Self {
        assert!(worker_threads > 0, "worker_threads must be > 0");
        self.worker_threads = worker_threads;
        self
    }

    /// Set the worker thread name prefix.
    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Build the provider.
    pub fn build(self) -> InstantiatingExecutorProvider {
        InstantiatingExecutorProvider {
            worker_threads: self.worker_threads,
            thread_name_prefix: self.thread_name_prefix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantiating_defaults() {
        let provider = InstantiatingExecutorProvider::default();
        assert!(provider.worker_threads() >= defaults::MIN_WORKER_THREADS);
        assert_eq!(provider.thread_name_prefix(), "rpc-settings");
        assert!(provider.should_auto_close());
    }

    #[test]
    fn test_instantiating_creates_fresh_runtime_each_call() {
        let provider = InstantiatingExecutorProvider::builder()
            .worker_threads(1)
            .build();

        let first = provider.executor().unwrap();
        let second = provider.executor().unwrap();

        assert!(first.is_owned());
        assert!(!Executor::ptr_eq(&first, &second));
    }

    #[test]
    fn test_instantiating_names_worker_threads() {
        let provider = InstantiatingExecutorProvider::builder()
            .worker_threads(1)
            .thread_name_prefix("echo-worker")
            .build();
        let executor = provider.executor().unwrap();

        let task = executor.spawn(async { std::thread::current().name().map(String::from) });
        let name = executor.handle().block_on(task).unwrap().unwrap();

        assert!(name.starts_with("echo-worker-"), "got {name}");
    }

    #[test]
    #[should_panic(expected = "worker_threads must be > 0")]
    fn test_instantiating_rejects_zero_threads() {
        InstantiatingExecutorProvider::builder().worker_threads(0);
    }

    #[tokio::test]
    async fn test_owned_executor_can_drop_in_async_context() {
        let provider = InstantiatingExecutorProvider::builder()
            .worker_threads(1)
            .build();
        let executor = provider.executor().unwrap();
        drop(executor);
    }

    #[tokio::test]
    async fn test_fixed_returns_same_executor() {
        let executor = Executor::current().unwrap();
        let provider = FixedExecutorProvider::new(executor.clone());

        assert!(!provider.should_auto_close());
        assert!(Executor::ptr_eq(&provider.executor().unwrap(), &executor));
        assert!(Executor::ptr_eq(
            &provider.executor().unwrap(),
            &provider.executor().unwrap()
        ));
        assert!(!executor.is_owned());
    }

    #[test]
    fn test_current_outside_runtime_fails() {
        assert!(matches!(Executor::current(), Err(ProviderError::Io(_))));
    }

    #[tokio::test]
    async fn test_spawn_on_current() {
        let executor = Executor::current().unwrap();
        let value = executor.spawn(async { 21 * 2 }).await.unwrap();
        assert_eq!(value, 42);
    }
}
