//! Verification notification worker.
//!
//! Thin entry point around [`domain_verification::NotificationHandler`]:
//! loads configuration, reads one event document, runs the batch, and
//! prints the terminal batch status string.

use clap::Parser;
use domain_verification::{HandlerConfig, NotificationEvent, NotificationHandler};
use eyre::WrapErr;
use std::io::Read;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(
    name = "verify-worker",
    about = "Sends account-verification emails for a batch of notification events"
)]
struct Args {
    /// Path to the event JSON document, or '-' to read from stdin.
    #[arg(long, default_value = "-")]
    event: String,
}

/// Initialize tracing with environment-aware configuration.
///
/// - `APP_ENV=production`: JSON format for log aggregation, `info` default.
/// - otherwise: pretty format, `debug` default.
/// - `RUST_LOG` overrides the filter in both cases.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init_tracing() {
    let is_production =
        std::env::var("APP_ENV").is_ok_and(|v| v.eq_ignore_ascii_case("production"));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("debug")
        }
    });

    let result = if is_production {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(false).pretty())
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    // Already-initialized is fine (common in tests)
    let _ = result;
}

fn read_event_document(source: &str) -> eyre::Result<String> {
    if source == "-" {
        let mut payload = String::new();
        std::io::stdin()
            .read_to_string(&mut payload)
            .wrap_err("failed to read event from stdin")?;
        Ok(payload)
    } else {
        std::fs::read_to_string(source)
            .wrap_err_with(|| format!("failed to read event file '{source}'"))
    }
}

pub async fn run() -> eyre::Result<()> {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();

    init_tracing();

    let args = Args::parse();

    let config = HandlerConfig::from_env().wrap_err("invalid handler configuration")?;
    info!(
        token_updates = config.database.is_some(),
        "Loaded handler configuration"
    );

    let handler = NotificationHandler::from_config(&config)?;

    let payload = read_event_document(&args.event)?;
    let event: NotificationEvent =
        serde_json::from_str(&payload).wrap_err("failed to decode notification event")?;

    info!(records = event.records.len(), "Handling notification batch");
    let status = handler.handle(event).await?;

    println!("{status}");
    Ok(())
}
