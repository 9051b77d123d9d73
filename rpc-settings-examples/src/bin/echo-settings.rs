//! Example 1: Build, derive and override Echo settings
//!
//! This example walks through the settings lifecycle of a generated client:
//! - Build settings with the library defaults
//! - Override method settings for every unary method at once
//! - Load method settings from JSON
//! - Derive staging settings with `to_builder`
//! - Resolve the settings into a runtime context
//!
//! Run with: RUST_LOG=debug cargo run --bin echo-settings

use std::time::Duration;

use rpc_settings::{
    BearerTokenCredentials, CallSettingsError, FixedCredentialsProvider, FixedHeaderProvider,
    RetrySettings, RuntimeContext, Settings, SettingsBuilder, TransportChannel,
};
use rpc_settings_examples::EchoSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== Example 1: Echo settings ===");

    let mut builder = EchoSettings::builder()
        .credentials_provider(FixedCredentialsProvider::new(BearerTokenCredentials::new(
            "demo-token",
        )))
        .header_provider(FixedHeaderProvider::try_from_pairs([("x-team", "platform")])?);

    builder.apply_to_all_unary_methods(|method| {
        method.set_retry_settings(RetrySettings::aggressive())?;
        Ok::<_, CallSettingsError>(())
    })?;
    builder.method_settings_from_json(r#"{ "expand": { "timeout": 30000 } }"#)?;

    let settings = builder.build()?;
    println!("Echo:   {:?}", settings.echo_settings());
    println!("Expand: {:?}", settings.expand_settings());

    let staging = settings
        .to_builder()
        .endpoint("http://staging.localhost:7469")
        .build()?;
    println!(
        "Production endpoint: {:?}",
        settings.client_settings().endpoint()
    );
    println!(
        "Staging endpoint:    {:?}",
        staging.client_settings().endpoint()
    );

    let context = RuntimeContext::create(staging.client_settings())?;
    println!(
        "Created {} channel to {:?} (owned: {})",
        context.transport_channel().transport_name(),
        context.endpoint(),
        context.owns_transport_channel()
    );

    // Keep the channel around long enough to show up in the logs.
    tokio::time::sleep(Duration::from_millis(10)).await;
    context.close();

    Ok(())
}
