//! Status codes and provider errors.
//!
//! - [`Code`]: RPC status codes, used by method-level call settings
//! - [`ProviderError`]: Failures reported by providers while resolving a value

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// RPC status codes, matching the codes defined by gRPC and the Connect protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    Ok = 0,
    #[serde(alias = "cancelled")]
    Canceled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl Code {
    /// Get the string representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Ok => "ok",
            Code::Canceled => "canceled",
            Code::Unknown => "unknown",
            Code::InvalidArgument => "invalid_argument",
            Code::DeadlineExceeded => "deadline_exceeded",
            Code::NotFound => "not_found",
            Code::AlreadyExists => "already_exists",
            Code::PermissionDenied => "permission_denied",
            Code::ResourceExhausted => "resource_exhausted",
            Code::FailedPrecondition => "failed_precondition",
            Code::Aborted => "aborted",
            Code::OutOfRange => "out_of_range",
            Code::Unimplemented => "unimplemented",
            Code::Internal => "internal",
            Code::Unavailable => "unavailable",
            Code::DataLoss => "data_loss",
            Code::Unauthenticated => "unauthenticated",
        }
    }

    /// Returns whether this code indicates a transient condition that may be
    /// resolved by retrying.
    ///
    /// Used as the default retryable set for unary call settings.
    ///
    /// ```
    /// use rpc_settings_core::Code;
    ///
    /// assert!(Code::Unavailable.is_retryable());
    /// assert!(!Code::NotFound.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Code::Unavailable | Code::ResourceExhausted | Code::Aborted
        )
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Code`] from a string fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseCodeError(());

impl std::fmt::Display for ParseCodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown status code")
    }
}

impl std::error::Error for ParseCodeError {}

impl FromStr for Code {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(Code::Ok),
            "canceled" | "cancelled" => Ok(Code::Canceled),
            "unknown" => Ok(Code::Unknown),
            "invalid_argument" => Ok(Code::InvalidArgument),
            "deadline_exceeded" => Ok(Code::DeadlineExceeded),
            "not_found" => Ok(Code::NotFound),
            "already_exists" => Ok(Code::AlreadyExists),
            "permission_denied" => Ok(Code::PermissionDenied),
            "resource_exhausted" => Ok(Code::ResourceExhausted),
            "failed_precondition" => Ok(Code::FailedPrecondition),
            "aborted" => Ok(Code::Aborted),
            "out_of_range" => Ok(Code::OutOfRange),
            "unimplemented" => Ok(Code::Unimplemented),
            "internal" => Ok(Code::Internal),
            "unavailable" => Ok(Code::Unavailable),
            "data_loss" => Ok(Code::DataLoss),
            "unauthenticated" => Ok(Code::Unauthenticated),
            _ => Err(ParseCodeError(())),
        }
    }
}

/// Errors reported by providers when asked for their value.
///
/// Instantiating providers may touch the operating system (spawning runtime
/// threads, loading credentials), so most variants describe resource
/// acquisition failures.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// An I/O failure while creating the provided resource.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The provider does not support the requested operation.
    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: &'static str,
        operation: &'static str,
    },

    /// A transport channel was requested before an endpoint was supplied.
    #[error("transport channel requires an endpoint")]
    MissingEndpoint,

    /// A header name or value could not be parsed.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The same header name was supplied more than once.
    #[error("duplicate header: {0}")]
    DuplicateHeader(String),

    /// Credentials could not produce request metadata.
    #[error("credentials error: {0}")]
    Credentials(String),
}

impl ProviderError {
    /// Create an [`Unsupported`](ProviderError::Unsupported) error.
    pub fn unsupported(provider: &'static str, operation: &'static str) -> Self {
        ProviderError::Unsupported {
            provider,
            operation,
        }
    }
}
