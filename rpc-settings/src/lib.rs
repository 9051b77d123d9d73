//! Client settings for generated RPC service clients.
//!
//! Every service client is configured by an immutable settings value that is
//! produced by a mutable builder. The client-wide part is shared by all
//! services:
//!
//! - executor provider (async call logic)
//! - credentials provider
//! - custom header provider and internal (library) header provider
//! - transport channel provider
//! - clock
//! - endpoint
//!
//! Per-service settings embed a [`ClientSettings`] next to their method-level
//! [`UnaryCallSettings`], and per-service builders embed a
//! [`ClientSettingsBuilder`] and implement [`SettingsBuilder`] so the
//! client-wide setters return the concrete builder.
//!
//! ## Construction
//!
//! A builder starts from one of three places:
//!
//! - library defaults: [`ClientSettingsBuilder::new`]
//! - a running client: [`ClientSettingsBuilder::from_context`], which freezes
//!   the live executor, channel, credentials and headers of a
//!   [`RuntimeContext`] into fixed providers
//! - existing settings: [`ClientSettings::to_builder`]
//!
//! ## Example
//!
//! ```ignore
//! use rpc_settings::{ClientSettingsBuilder, RuntimeContext, SettingsBuilder};
//! use rpc_settings::transport::HttpChannelProvider;
//!
//! let settings = ClientSettingsBuilder::new()
//!     .transport_channel_provider(HttpChannelProvider::default())
//!     .endpoint("http://localhost:3000")
//!     .build()?;
//!
//! // Resolve every provider into live values.
//! let context = RuntimeContext::create(&settings)?;
//!
//! // Same transport, different endpoint.
//! let staging = settings.to_builder().endpoint("http://staging:3000").build()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `tracing`: emit `debug` events when settings are derived from a runtime
//!   context and when runtime contexts, runtimes or channels are created

mod builder;
pub mod config;
mod context;
mod error;
#[doc(hidden)]
pub mod internal;
mod settings;
pub mod transport;

#[cfg(test)]
mod test_util;

pub use builder::{ClientSettingsBuilder, SettingsBuilder, apply_to_all_unary_methods};
pub use config::{RetrySettings, UnaryCallSettings, UnaryCallSettingsBuilder};
pub use context::{RuntimeContext, RuntimeContextBuilder};
pub use error::{BuildError, CallSettingsError, SettingsError};
pub use settings::{ClientSettings, Settings};

// Re-export provider types for convenience
pub use rpc_settings_core::{
    BearerTokenCredentials, Clock, Code, Credentials, CredentialsProvider, Executor,
    ExecutorProvider, FixedCredentialsProvider, FixedExecutorProvider, FixedHeaderProvider,
    FixedTransportChannelProvider, HeaderProvider, InstantiatingExecutorProvider,
    InstantiatingExecutorProviderBuilder, NoCredentialsProvider, NoHeaderProvider, ProviderError,
    SystemClock, TransportChannel, TransportChannelProvider,
};
