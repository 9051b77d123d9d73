//! Transport channel providers shipped with client settings.
//!
//! - [`HttpChannelProvider`]: pooled HTTP/1.1 and HTTP/2 (h2c) channel built
//!   on hyper_util's legacy client
//!
//! # Example
//!
//! ```ignore
//! use rpc_settings::transport::HttpChannelProvider;
//! use std::time::Duration;
//!
//! let provider = HttpChannelProvider::builder()
//!     .http2_only(true)
//!     .pool_idle_timeout(Duration::from_secs(60))
//!     .build();
//! ```

mod http;

pub use self::http::{
    HttpChannel, HttpChannelProvider, HttpChannelProviderBuilder, HttpClient, defaults,
};
