//! Provider abstractions for rpc-settings.
//!
//! This crate provides the capability traits consumed by client settings
//! (`rpc-settings`) together with their fixed and default implementations.
//!
//! ## Modules
//!
//! - [`error`]: Status codes and provider errors
//! - [`executor`]: Executor handle and executor providers
//! - [`credentials`]: Call credentials and credentials providers
//! - [`header`]: Static header providers
//! - [`transport`]: Transport channel and channel providers
//! - [`clock`]: Time sources

mod clock;
mod credentials;
mod error;
mod executor;
mod header;
mod transport;

pub use clock::*;
pub use credentials::*;
pub use error::*;
pub use executor::*;
pub use header::*;
pub use transport::*;
