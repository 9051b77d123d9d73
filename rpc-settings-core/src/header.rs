//! Static header providers.
//!
//! A client calls its header providers once during construction and attaches
//! the resulting headers to every request. Reserved headers (`content-type`,
//! `user-agent`, ...) may be overridden or merged by the transport; that is
//! the transport's concern, not the provider's.

use std::fmt;

use http::{HeaderMap, HeaderName, HeaderValue};

use crate::ProviderError;

/// Supplies static headers for outgoing requests.
pub trait HeaderProvider: Send + Sync + fmt::Debug {
    /// Get the headers.
    fn headers(&self) -> HeaderMap;
}

/// Header provider that supplies no headers.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHeaderProvider;

impl NoHeaderProvider {
    /// Create an empty header provider.
    pub fn new() -> Self {
        Self
    }
}

impl HeaderProvider for NoHeaderProvider {
    fn headers(&self) -> HeaderMap {
        HeaderMap::new()
    }
}

/// Header provider that always supplies the same headers.
///
/// # Example
///
/// ```
/// use rpc_settings_core::{FixedHeaderProvider, HeaderProvider};
///
/// let provider = FixedHeaderProvider::try_from_pairs([
///     ("x-goog-user-project", "my-project"),
///     ("x-request-reason", "debugging"),
/// ])?;
/// assert_eq!(provider.headers().len(), 2);
/// # Ok::<(), rpc_settings_core::ProviderError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct FixedHeaderProvider {
    headers: HeaderMap,
}

impl FixedHeaderProvider {
    /// Create a provider around a header map.
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    /// Create a provider from name/value pairs.
    ///
    /// # Errors
    ///
    /// Fails if a name or value is invalid, or if a name appears twice
    /// (names are compared case-insensitively).
    pub fn try_from_pairs<I, K, V>(pairs: I) -> Result<Self, ProviderError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            let name = name.as_ref();
            let header_name = HeaderName::try_from(name)
                .map_err(|_| ProviderError::InvalidHeader(format!("invalid header name: {name}")))?;
            let header_value = HeaderValue::try_from(value.as_ref()).map_err(|_| {
                ProviderError::InvalidHeader(format!("invalid value for header {name}"))
            })?;
            if headers.contains_key(&header_name) {
                return Err(ProviderError::DuplicateHeader(header_name.to_string()));
            }
            headers.insert(header_name, header_value);
        }
        Ok(Self { headers })
    }
}

impl HeaderProvider for FixedHeaderProvider {
    fn headers(&self) -> HeaderMap {
        self.headers.clone()
    }
}
