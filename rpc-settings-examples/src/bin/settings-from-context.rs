//! Example 2: Freeze a running client's context into settings
//!
//! A second client created from the first one's context reuses its live
//! executor, transport channel, credentials and headers instead of creating
//! new ones. Only the first client owns (and closes) the channel.
//!
//! Run with: RUST_LOG=debug cargo run --bin settings-from-context

use std::sync::Arc;

use rpc_settings::{
    RuntimeContext, Settings, SettingsBuilder, TransportChannel, TransportChannelProvider,
};
use rpc_settings_examples::{EchoSettings, EchoSettingsBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== Example 2: Settings from a runtime context ===");

    let first = EchoSettings::builder().build()?;
    let first_context = RuntimeContext::create(first.client_settings())?;

    let second = EchoSettingsBuilder::from_context(Some(&first_context)).build()?;
    let transport = second.client_settings().transport_channel_provider();
    println!("Second client transport provider: {transport:?}");
    println!("Second client needs endpoint: {}", transport.needs_endpoint());

    let second_context = RuntimeContext::create(second.client_settings())?;
    println!(
        "Shares the channel: {}",
        Arc::ptr_eq(
            first_context.transport_channel(),
            second_context.transport_channel()
        )
    );
    println!(
        "Owned by first: {}, by second: {}",
        first_context.owns_transport_channel(),
        second_context.owns_transport_channel()
    );

    second_context.close();
    println!(
        "After closing second: shut down = {}",
        first_context.transport_channel().is_shutdown()
    );
    first_context.close();
    println!(
        "After closing first:  shut down = {}",
        first_context.transport_channel().is_shutdown()
    );

    Ok(())
}
