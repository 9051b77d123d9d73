//! Call credentials and credentials providers.

use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

use crate::ProviderError;

/// Credentials attached to every call a client makes.
///
/// Implementations turn themselves into request metadata. Refreshing and
/// caching tokens is the implementation's own business.
pub trait Credentials: Send + Sync + fmt::Debug {
    /// Short name of the authentication scheme (e.g. `"bearer"`).
    fn authentication_type(&self) -> &str;

    /// Headers to attach to an outgoing request.
    fn request_metadata(&self) -> Result<HeaderMap, ProviderError>;
}

/// Static bearer token credentials.
///
/// Produces an `authorization: Bearer <token>` header. The token is not
/// printed by `Debug`.
#[derive(Clone)]
pub struct BearerTokenCredentials {
    token: String,
}

impl BearerTokenCredentials {
    /// Create credentials for a fixed token.
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for BearerTokenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenCredentials")
            .finish_non_exhaustive()
    }
}

impl Credentials for BearerTokenCredentials {
    fn authentication_type(&self) -> &str {
        "bearer"
    }

    fn request_metadata(&self) -> Result<HeaderMap, ProviderError> {
        let mut value = HeaderValue::try_from(format!("Bearer {}", self.token))
            .map_err(|_| ProviderError::Credentials("token is not a valid header value".into()))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

/// Supplies the credentials a client makes calls with.
///
/// `Ok(None)` means calls are made without credentials.
pub trait CredentialsProvider: Send + Sync + fmt::Debug {
    /// Get the credentials.
    fn credentials(&self) -> Result<Option<Arc<dyn Credentials>>, ProviderError>;
}

/// Credentials provider for clients that should not send any credentials.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCredentialsProvider;

impl NoCredentialsProvider {
    /// Create a no-credentials provider.
    pub fn new() -> Self {
        Self
    }
}

impl CredentialsProvider for NoCredentialsProvider {
    fn credentials(&self) -> Result<Option<Arc<dyn Credentials>>, ProviderError> {
        Ok(None)
    }
}

/// Credentials provider that always returns the same credentials.
#[derive(Clone, Debug)]
pub struct FixedCredentialsProvider {
    credentials: Option<Arc<dyn Credentials>>,
}

impl FixedCredentialsProvider {
    /// Create a provider that always returns `credentials`.
    pub fn new<C: Credentials + 'static>(credentials: C) -> Self {
        Self {
            credentials: Some(Arc::new(credentials)),
        }
    }

    /// Create a provider around already shared (or absent) credentials.
    pub fn from_shared(credentials: Option<Arc<dyn Credentials>>) -> Self {
        Self { credentials }
    }
}

impl CredentialsProvider for FixedCredentialsProvider {
    fn credentials(&self) -> Result<Option<Arc<dyn Credentials>>, ProviderError> {
        Ok(self.credentials.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_credentials() {
        assert!(NoCredentialsProvider::new().credentials().unwrap().is_none());
    }

    #[test]
    fn test_bearer_token_metadata() {
        let creds = BearerTokenCredentials::new("token123");
        let headers = creds.request_metadata().unwrap();

        assert_eq!(creds.authentication_type(), "bearer");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer token123");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn test_bearer_token_invalid_value() {
        let creds = BearerTokenCredentials::new("bad\ntoken");
        assert!(matches!(
            creds.request_metadata(),
            Err(ProviderError::Credentials(_))
        ));
    }

    #[test]
    fn test_bearer_token_debug_hides_token() {
        let creds = BearerTokenCredentials::new("secret");
        assert!(!format!("{creds:?}").contains("secret"));
    }

    #[test]
    fn test_fixed_returns_same_credentials() {
        let shared: Arc<dyn Credentials> = Arc::new(BearerTokenCredentials::new("t"));
        let provider = FixedCredentialsProvider::from_shared(Some(shared.clone()));

        let got = provider.credentials().unwrap().unwrap();
        assert!(Arc::ptr_eq(&got, &shared));
    }

    #[test]
    fn test_fixed_absent_credentials() {
        let provider = FixedCredentialsProvider::from_shared(None);
        assert!(provider.credentials().unwrap().is_none());
    }
}
