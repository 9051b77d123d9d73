//! Settings of a sample `Echo` service, written the way a generated client
//! library would write them.
//!
//! `EchoSettings` embeds the client-wide [`ClientSettings`] and adds one
//! [`UnaryCallSettings`] per method. `EchoSettingsBuilder` embeds a
//! [`ClientSettingsBuilder`], so the client-wide setters of
//! [`SettingsBuilder`] return an `EchoSettingsBuilder`.

use std::sync::Arc;
use std::time::Duration;

use rpc_settings::internal::InternalHeadersBuilder;
use rpc_settings::transport::HttpChannelProvider;
use rpc_settings::{
    BuildError, CallSettingsError, ClientSettings, ClientSettingsBuilder, Code,
    FixedHeaderProvider, RetrySettings, RuntimeContext, Settings, SettingsBuilder,
    UnaryCallSettings, UnaryCallSettingsBuilder, apply_to_all_unary_methods,
};
use serde::Deserialize;

/// Default address of the Echo service.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:7469";

/// Value of the library identification header.
pub const CLIENT_LIB_HEADER: &str = concat!("echo-rust/", env!("CARGO_PKG_VERSION"));

/// Settings of an Echo client.
#[derive(Clone, Debug)]
pub struct EchoSettings {
    client: ClientSettings,
    echo: UnaryCallSettings,
    expand: UnaryCallSettings,
}

impl EchoSettings {
    pub fn builder() -> EchoSettingsBuilder {
        EchoSettingsBuilder::new()
    }

    /// Settings of the `Echo` method.
    pub fn echo_settings(&self) -> &UnaryCallSettings {
        &self.echo
    }

    /// Settings of the `Expand` method.
    pub fn expand_settings(&self) -> &UnaryCallSettings {
        &self.expand
    }

    /// The transport used when none is set.
    pub fn default_transport_channel_provider() -> HttpChannelProvider {
        HttpChannelProvider::builder().http2_only(true).build()
    }
}

impl Settings for EchoSettings {
    type Builder = EchoSettingsBuilder;

    fn client_settings(&self) -> &ClientSettings {
        &self.client
    }

    fn to_builder(&self) -> EchoSettingsBuilder {
        EchoSettingsBuilder::from_settings(self)
    }
}

/// Builder for [`EchoSettings`].
#[derive(Clone, Debug)]
pub struct EchoSettingsBuilder {
    client: ClientSettingsBuilder,
    echo: UnaryCallSettingsBuilder,
    expand: UnaryCallSettingsBuilder,
}

impl Default for EchoSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EchoSettingsBuilder {
    /// Create a builder with the Echo defaults.
    ///
    /// - endpoint: [`DEFAULT_ENDPOINT`]
    /// - `Echo`: retried on `unavailable` and `deadline_exceeded`, 10s per
    ///   attempt
    /// - `Expand`: single attempt, 60s
    pub fn new() -> Self {
        Self::from_context(None)
    }

    /// Create a builder from a running client's context, or with the Echo
    /// defaults when there is none.
    pub fn from_context(context: Option<&RuntimeContext>) -> Self {
        let mut client = ClientSettingsBuilder::from_context(context);
        if context.is_none() {
            client.set_endpoint(Some(DEFAULT_ENDPOINT.to_string()));
            client.set_internal_header_provider(Arc::new(FixedHeaderProvider::new(
                client_lib_headers(),
            )));
        }

        let mut echo = UnaryCallSettingsBuilder::new();
        echo.set_retryable_codes([Code::Unavailable, Code::DeadlineExceeded])
            .set_timeout(Some(Duration::from_secs(10)));

        let mut expand = UnaryCallSettingsBuilder::new();
        expand.set_simple_timeout_no_retries(Duration::from_secs(60));

        Self {
            client,
            echo,
            expand,
        }
    }

    /// Create a builder holding exactly the values of `settings`.
    pub fn from_settings(settings: &EchoSettings) -> Self {
        Self {
            client: settings.client.to_builder(),
            echo: settings.echo.to_builder(),
            expand: settings.expand.to_builder(),
        }
    }

    /// Builder of the `Echo` method settings.
    pub fn echo_settings(&mut self) -> &mut UnaryCallSettingsBuilder {
        &mut self.echo
    }

    /// Builder of the `Expand` method settings.
    pub fn expand_settings(&mut self) -> &mut UnaryCallSettingsBuilder {
        &mut self.expand
    }

    /// Apply `updater` to every unary method, stopping at the first error.
    pub fn apply_to_all_unary_methods<F, E>(&mut self, updater: F) -> Result<&mut Self, E>
    where
        F: FnMut(&mut UnaryCallSettingsBuilder) -> Result<(), E>,
    {
        apply_to_all_unary_methods([&mut self.echo, &mut self.expand], updater)?;
        Ok(self)
    }

    /// Override method settings from a JSON document.
    ///
    /// Methods missing from the document keep their current settings. Retry
    /// settings are validated, and nothing is changed when any method fails.
    pub fn method_settings_from_json(
        &mut self,
        json: &str,
    ) -> Result<&mut Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct MethodSettings {
            echo: Option<UnaryCallSettings>,
            expand: Option<UnaryCallSettings>,
        }

        let methods: MethodSettings = serde_json::from_str(json)?;
        if let Some(echo) = methods.echo {
            self.echo = echo.to_builder();
        }
        if let Some(expand) = methods.expand {
            self.expand = expand.to_builder();
        }
        Ok(self)
    }

    /// Retry the `Echo` method with `retry_settings`.
    pub fn echo_retry_settings(
        mut self,
        retry_settings: RetrySettings,
    ) -> Result<Self, CallSettingsError> {
        self.echo.set_retry_settings(retry_settings)?;
        Ok(self)
    }
}

impl SettingsBuilder for EchoSettingsBuilder {
    type Settings = EchoSettings;

    fn client_settings(&self) -> &ClientSettingsBuilder {
        &self.client
    }

    fn client_settings_mut(&mut self) -> &mut ClientSettingsBuilder {
        &mut self.client
    }

    fn build(&self) -> Result<EchoSettings, BuildError> {
        let mut client = self.client.clone();
        if client.get_transport_channel_provider().is_none() {
            client.set_transport_channel_provider(Some(Arc::new(
                EchoSettings::default_transport_channel_provider(),
            )));
        }
        Ok(EchoSettings {
            client: client.build()?,
            echo: self.echo.build(),
            expand: self.expand.build(),
        })
    }
}

fn client_lib_headers() -> http::HeaderMap {
    let mut headers = http::HeaderMap::new();
    headers.insert(
        "x-client-lib",
        http::HeaderValue::from_static(CLIENT_LIB_HEADER),
    );
    headers
}
