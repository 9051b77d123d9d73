//! Error types for building settings and runtime contexts.

use rpc_settings_core::ProviderError;

/// A precondition violated while staging settings.
///
/// These indicate programming errors in the caller; nothing is retried.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A credentials provider is required.
    #[error("credentials provider must be set; use NoCredentialsProvider to send no credentials")]
    NullCredentialsProvider,
}

/// Failure to finalize settings or to create a runtime context from them.
///
/// Errors raised by a per-service builder while preparing its own defaults
/// (for example discovering default credentials) travel through
/// [`Provider`](BuildError::Provider) and [`Io`](BuildError::Io) unmodified.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No transport channel provider was staged and none was defaulted.
    #[error("transport channel provider must be set before building settings")]
    MissingTransportChannelProvider,

    /// The executor provider was explicitly cleared.
    #[error("executor provider is not set")]
    MissingExecutorProvider,

    /// The same header is supplied by both the user and the internal header provider.
    #[error("header {0} is supplied by both the user and the internal header provider")]
    DuplicateHeader(String),

    /// A provider failed to supply its value.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// An I/O failure during finalization.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid method-level call settings.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CallSettingsError {
    /// The retry settings are inconsistent.
    #[error("invalid retry settings: {0}")]
    InvalidRetrySettings(&'static str),
}
