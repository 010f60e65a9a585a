//! Verification Worker - Entry Point
//!
//! Processes one batch of account-verification notification events.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    verify_worker::run().await
}
