//! Method-level settings for unary calls.

use std::collections::BTreeSet;
use std::time::Duration;

use rpc_settings_core::Code;
use serde::{Deserialize, Serialize};

use super::option_duration_millis;
use super::retry::RetrySettings;
use crate::error::CallSettingsError;

/// Immutable settings of one unary method.
///
/// # Example
///
/// ```
/// use rpc_settings::{Code, UnaryCallSettings};
///
/// let settings: UnaryCallSettings = serde_json::from_str(
///     r#"{ "retryable_codes": ["unavailable"], "timeout": 5000 }"#,
/// )
/// .unwrap();
///
/// assert!(settings.retryable_codes().contains(&Code::Unavailable));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnaryCallSettings {
    retryable_codes: BTreeSet<Code>,
    retry_settings: RetrySettings,
    #[serde(with = "option_duration_millis")]
    timeout: Option<Duration>,
}

impl UnaryCallSettings {
    /// Create a builder with default method settings.
    pub fn builder() -> UnaryCallSettingsBuilder {
        UnaryCallSettingsBuilder::new()
    }

    /// Status codes a call may be retried on.
    pub fn retryable_codes(&self) -> &BTreeSet<Code> {
        &self.retryable_codes
    }

    pub fn retry_settings(&self) -> &RetrySettings {
        &self.retry_settings
    }

    /// Timeout of a single attempt, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// A builder pre-populated with these settings.
    pub fn to_builder(&self) -> UnaryCallSettingsBuilder {
        UnaryCallSettingsBuilder {
            settings: self.clone(),
        }
    }
}

/// Mutable staging area for [`UnaryCallSettings`].
///
/// Defaults: no retryable codes, [`RetrySettings::default`], no timeout.
#[derive(Clone, Debug, Default)]
pub struct UnaryCallSettingsBuilder {
    settings: UnaryCallSettings,
}

impl UnaryCallSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of retryable status codes.
    pub fn set_retryable_codes<I>(&mut self, codes: I) -> &mut Self
    where
        I: IntoIterator<Item = Code>,
    {
        self.settings.retryable_codes = codes.into_iter().collect();
        self
    }

    /// Replace the retry settings.
    ///
    /// # Errors
    ///
    /// Returns [`CallSettingsError::InvalidRetrySettings`] if `retry_settings`
    /// fails [`RetrySettings::validate`]; the staged value is left unchanged.
    pub fn set_retry_settings(
        &mut self,
        retry_settings: RetrySettings,
    ) -> Result<&mut Self, CallSettingsError> {
        retry_settings.validate()?;
        self.settings.retry_settings = retry_settings;
        Ok(self)
    }

    /// Set or clear the timeout of a single attempt.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.settings.timeout = timeout;
        self
    }

    /// Make the method a single attempt bounded by `timeout`.
    ///
    /// Clears the retryable codes and uses [`RetrySettings::no_retry`] with
    /// `timeout` as the total timeout.
    pub fn set_simple_timeout_no_retries(&mut self, timeout: Duration) -> &mut Self {
        self.settings.retryable_codes.clear();
        self.settings.retry_settings = RetrySettings::no_retry().total_timeout(timeout);
        self.settings.timeout = Some(timeout);
        self
    }

    pub fn get_retryable_codes(&self) -> &BTreeSet<Code> {
        &self.settings.retryable_codes
    }

    pub fn get_retry_settings(&self) -> &RetrySettings {
        &self.settings.retry_settings
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.settings.timeout
    }

    /// Build the settings. The builder stays usable.
    pub fn build(&self) -> UnaryCallSettings {
        self.settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unary_defaults() {
        let settings = UnaryCallSettings::builder().build();
        assert!(settings.retryable_codes().is_empty());
        assert_eq!(settings.retry_settings(), &RetrySettings::default());
        assert_eq!(settings.timeout(), None);
    }

    #[test]
    fn test_set_retryable_codes_replaces() {
        let mut builder = UnaryCallSettingsBuilder::new();
        builder.set_retryable_codes([Code::Unavailable, Code::Aborted]);
        builder.set_retryable_codes([Code::DeadlineExceeded, Code::DeadlineExceeded]);

        let codes: Vec<_> = builder.get_retryable_codes().iter().copied().collect();
        assert_eq!(codes, [Code::DeadlineExceeded]);
    }

    #[test]
    fn test_invalid_retry_settings_leave_builder_unchanged() {
        let mut builder = UnaryCallSettingsBuilder::new();
        builder
            .set_retry_settings(RetrySettings::aggressive())
            .unwrap();

        let err = builder
            .set_retry_settings(RetrySettings {
                max_attempts: 0,
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, CallSettingsError::InvalidRetrySettings(_)));
        assert_eq!(builder.get_retry_settings(), &RetrySettings::aggressive());
    }

    #[test]
    fn test_simple_timeout_no_retries() {
        let mut builder = UnaryCallSettingsBuilder::new();
        builder.set_retryable_codes([Code::Unavailable]);
        builder.set_simple_timeout_no_retries(Duration::from_secs(5));

        let settings = builder.build();
        assert!(settings.retryable_codes().is_empty());
        assert_eq!(settings.retry_settings().max_attempts, 1);
        assert_eq!(
            settings.retry_settings().total_timeout,
            Some(Duration::from_secs(5))
        );
        assert_eq!(settings.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_to_builder_is_independent() {
        let mut builder = UnaryCallSettingsBuilder::new();
        builder.set_timeout(Some(Duration::from_secs(1)));
        let original = builder.build();

        let mut copy = original.to_builder();
        copy.set_timeout(None);

        assert_eq!(original.timeout(), Some(Duration::from_secs(1)));
        assert_eq!(copy.get_timeout(), None);
        assert_eq!(original.to_builder().build(), original);
    }

    #[test]
    fn test_unary_settings_from_json() {
        let settings: UnaryCallSettings = serde_json::from_str(
            r#"{
                "retryable_codes": ["unavailable", "deadline_exceeded"],
                "retry_settings": { "max_attempts": 3 },
                "timeout": 2500
            }"#,
        )
        .unwrap();

        assert_eq!(settings.retryable_codes().len(), 2);
        assert!(settings.retryable_codes().contains(&Code::DeadlineExceeded));
        assert_eq!(settings.retry_settings().max_attempts, 3);
        assert_eq!(settings.timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_unary_settings_rejects_unknown_code() {
        let result = serde_json::from_str::<UnaryCallSettings>(r#"{ "retryable_codes": ["flaky"] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unary_settings_from_json_rejects_invalid_retry_settings() {
        let result = serde_json::from_str::<UnaryCallSettings>(
            r#"{ "retry_settings": { "max_attempts": 0 } }"#,
        );
        assert!(result.is_err());
    }
}
