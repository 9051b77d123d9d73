//! Retry settings for unary methods.
//!
//! [`RetrySettings`] describes how a call would be retried with exponential
//! backoff following the
//! [gRPC connection backoff specification](https://github.com/grpc/grpc/blob/master/doc/connection-backoff.md).
//! It is configuration only; retrying is done by the client that consumes it.
//!
//! Retry settings can be loaded from JSON. Durations are written in
//! milliseconds and every field is optional:
//!
//! ```
//! use rpc_settings::RetrySettings;
//! use std::time::Duration;
//!
//! let settings: RetrySettings =
//!     serde_json::from_str(r#"{ "max_attempts": 6, "max_retry_delay": 30000 }"#).unwrap();
//!
//! assert_eq!(settings.max_attempts, 6);
//! assert_eq!(settings.max_retry_delay, Duration::from_secs(30));
//! assert_eq!(settings.initial_retry_delay, Duration::from_secs(1));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{duration_millis, option_duration_millis};
use crate::error::CallSettingsError;

/// Default configuration values based on gRPC connection backoff spec.
/// See: https://github.com/grpc/grpc/blob/master/doc/connection-backoff.md
pub mod defaults {
    use std::time::Duration;

    /// Default delay before the first retry.
    pub const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);

    /// Default multiplier for exponential backoff.
    pub const RETRY_DELAY_MULTIPLIER: f64 = 1.6;

    /// Default jitter factor (0.2 means +/- 20%).
    pub const JITTER: f64 = 0.2;

    /// Default maximum delay between retries.
    pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(120);

    /// Default maximum number of attempts, the initial call included.
    pub const MAX_ATTEMPTS: u32 = 4;
}

/// Configuration for retry behavior.
///
/// # Default Values
///
/// - `initial_retry_delay`: 1 second
/// - `retry_delay_multiplier`: 1.6
/// - `max_retry_delay`: 120 seconds
/// - `max_attempts`: 4 (the initial call plus 3 retries)
/// - `jitter`: 0.2 (20%)
/// - `total_timeout`: none
///
/// # Example
///
/// ```
/// use rpc_settings::RetrySettings;
/// use std::time::Duration;
///
/// let settings = RetrySettings::new()
///     .max_attempts(6)
///     .initial_retry_delay(Duration::from_millis(100))
///     .max_retry_delay(Duration::from_secs(30));
///
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRetrySettings")]
pub struct RetrySettings {
    /// Delay before the first retry.
    #[serde(with = "duration_millis")]
    pub initial_retry_delay: Duration,

    /// Multiplier for exponential backoff. Should be >= 1.0.
    pub retry_delay_multiplier: f64,

    /// Maximum delay between retries. The delay will never exceed this value.
    #[serde(with = "duration_millis")]
    pub max_retry_delay: Duration,

    /// Maximum number of attempts, the initial call included. `1` disables
    /// retries.
    pub max_attempts: u32,

    /// Jitter factor for randomizing delays. Value between 0.0 and 1.0.
    pub jitter: f64,

    /// Budget for all attempts together, if any.
    #[serde(with = "option_duration_millis")]
    pub total_timeout: Option<Duration>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            initial_retry_delay: defaults::INITIAL_RETRY_DELAY,
            retry_delay_multiplier: defaults::RETRY_DELAY_MULTIPLIER,
            max_retry_delay: defaults::MAX_RETRY_DELAY,
            max_attempts: defaults::MAX_ATTEMPTS,
            jitter: defaults::JITTER,
            total_timeout: None,
        }
    }
}

/// Wire form of [`RetrySettings`], checked with [`RetrySettings::validate`]
/// before it is accepted.
#[derive(Deserialize)]
#[serde(default)]
struct RawRetrySettings {
    #[serde(with = "duration_millis")]
    initial_retry_delay: Duration,
    retry_delay_multiplier: f64,
    #[serde(with = "duration_millis")]
    max_retry_delay: Duration,
    max_attempts: u32,
    jitter: f64,
    #[serde(with = "option_duration_millis")]
    total_timeout: Option<Duration>,
}

impl Default for RawRetrySettings {
    fn default() -> Self {
        let settings = RetrySettings::default();
        Self {
            initial_retry_delay: settings.initial_retry_delay,
            retry_delay_multiplier: settings.retry_delay_multiplier,
            max_retry_delay: settings.max_retry_delay,
            max_attempts: settings.max_attempts,
            jitter: settings.jitter,
            total_timeout: settings.total_timeout,
        }
    }
}

impl TryFrom<RawRetrySettings> for RetrySettings {
    type Error = CallSettingsError;

    fn try_from(raw: RawRetrySettings) -> Result<Self, Self::Error> {
        let settings = Self {
            initial_retry_delay: raw.initial_retry_delay,
            retry_delay_multiplier: raw.retry_delay_multiplier,
            max_retry_delay: raw.max_retry_delay,
            max_attempts: raw.max_attempts,
            jitter: raw.jitter,
            total_timeout: raw.total_timeout,
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl RetrySettings {
    /// Create retry settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retry settings that make a single attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Retry settings for latency-sensitive calls.
    ///
    /// - Initial delay: 50ms
    /// - Max delay: 1 second
    /// - Max attempts: 6
    pub fn aggressive() -> Self {
        Self {
            initial_retry_delay: Duration::from_millis(50),
            max_retry_delay: Duration::from_secs(1),
            max_attempts: 6,
            ..Default::default()
        }
    }

    /// Retry settings for background calls.
    ///
    /// - Initial delay: 2 seconds
    /// - Max delay: 5 minutes
    /// - Max attempts: 11
    pub fn patient() -> Self {
        Self {
            initial_retry_delay: Duration::from_secs(2),
            max_retry_delay: Duration::from_secs(300),
            max_attempts: 11,
            ..Default::default()
        }
    }

    /// Set the maximum number of attempts.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay before the first retry.
    pub fn initial_retry_delay(mut self, delay: Duration) -> Self {
        self.initial_retry_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_retry_delay(mut self, delay: Duration) -> Self {
        self.max_retry_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `multiplier` is not finite or is less than 1.0.
    pub fn retry_delay_multiplier(mut self, multiplier: f64) -> Self {
        assert!(
            multiplier.is_finite() && multiplier >= 1.0,
            "multiplier must be finite and >= 1.0"
        );
        self.retry_delay_multiplier = multiplier;
        self
    }

    /// Set the jitter factor.
    ///
    /// # Panics
    ///
    /// Panics if `jitter` is not between 0.0 and 1.0.
    pub fn jitter(mut self, jitter: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&jitter),
            "jitter must be between 0.0 and 1.0"
        );
        self.jitter = jitter;
        self
    }

    /// Set the budget for all attempts together.
    pub fn total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = Some(timeout);
        self
    }

    /// Validate the configuration.
    ///
    /// Struct-literal settings bypass the panicking setters, so consumers
    /// should call this before use. Deserialization calls it already.
    pub fn validate(&self) -> Result<(), CallSettingsError> {
        if self.initial_retry_delay > self.max_retry_delay {
            return Err(CallSettingsError::InvalidRetrySettings(
                "initial_retry_delay must not exceed max_retry_delay",
            ));
        }
        if !self.retry_delay_multiplier.is_finite() || self.retry_delay_multiplier < 1.0 {
            return Err(CallSettingsError::InvalidRetrySettings(
                "retry_delay_multiplier must be finite and >= 1.0",
            ));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(CallSettingsError::InvalidRetrySettings(
                "jitter must be between 0.0 and 1.0",
            ));
        }
        if self.max_attempts == 0 {
            return Err(CallSettingsError::InvalidRetrySettings(
                "max_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}
