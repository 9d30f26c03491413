//! VRF harness
//!
//! Local driver for the request/fulfill protocol. On a development network
//! it deploys the coordinator mock, starts the simulated oracle node and
//! plays one raffle round end to end:
//!
//! - **Deploy**: mock coordinator, funded subscription, raffle consumer.
//! - **Oracle**: listener + fulfiller answering `RandomWordsRequested`.
//! - **Round**: enter, request a winner, await `WinnerPicked`.
//!
//! Live networks are reported and skipped; there is nothing in-process to
//! drive there.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};
use vrf_harness::config::AppConfig;
use vrf_harness::consumers::ConsumerDirectory;
use vrf_harness::deploy::{CoordinatorBinding, resolve_coordinator};
use vrf_harness::{SharedConsumer, oracle, scenario};
use vrf_mock::Address;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_ansi(true)
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    info!(
        network = %config.network.name,
        development = config.network.development,
        "Starting VRF harness"
    );

    let coordinator = match resolve_coordinator(&config) {
        CoordinatorBinding::Mock(mock) => Arc::new(Mutex::new(mock)),
        CoordinatorBinding::Live(address) => {
            info!(
                network = %config.network.name,
                coordinator = %address,
                staging = config.network.staging_enabled(),
                "Live coordinator configured, nothing to run locally"
            );
            return Ok(());
        }
        CoordinatorBinding::Unbound => {
            bail!("no VRF coordinator known for network {}", config.network.name)
        }
    };

    let (raffle, subscription_id) = scenario::deploy_raffle(&coordinator, &config)?;

    let mut consumers = ConsumerDirectory::new();
    consumers.register(raffle.clone() as SharedConsumer);

    let oracle =
        oracle::start_oracle(coordinator.clone(), consumers, config.fulfillment_delay).await;

    let player = Address::from_label("player");
    let report = scenario::run_raffle_round(&coordinator, &raffle, player, config.event_timeout)
        .await
        .context("raffle round failed")?;

    info!(
        subscription_id,
        request_id = report.request_id,
        winner = %report.winner,
        winnings = %report.winnings_after,
        elapsed = ?report.elapsed,
        "Round complete"
    );
    info!(metrics = %oracle.metrics().to_json(), "Oracle metrics");

    Ok(())
}
