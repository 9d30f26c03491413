use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use raffle::{RaffleState, WinnerPicked};
use tracing::info;
use vrf_harness::await_event::{EventAwait, HarnessError};
use vrf_harness::config::{AppConfig, NetworkConfig};
use vrf_harness::consumers::ConsumerDirectory;
use vrf_harness::deploy::{CoordinatorBinding, deploy_mocks, resolve_coordinator};
use vrf_harness::{SharedConsumer, SharedCoordinator, lock, oracle, scenario};
use vrf_mock::events::RandomWordsRequested;
use vrf_mock::{Address, Amount, ContractEvent, VrfConsumer, VrfError};

const CALLBACK_GAS_LIMIT: u32 = 100_000;

fn local_coordinator() -> Result<(SharedCoordinator, AppConfig)> {
    let mut config = AppConfig::local()?;
    config.callback_gas_limit = CALLBACK_GAS_LIMIT;
    config.event_timeout = Duration::from_secs(5);
    match resolve_coordinator(&config) {
        CoordinatorBinding::Mock(mock) => Ok((Arc::new(Mutex::new(mock)), config)),
        _ => anyhow::bail!("local config did not deploy a mock"),
    }
}

#[tokio::test]
async fn request_then_fulfill_settles_the_raffle() -> Result<()> {
    let (coordinator, config) = local_coordinator()?;
    let (raffle, subscription_id) = scenario::deploy_raffle(&coordinator, &config)?;
    assert_eq!(subscription_id, 1);
    assert_eq!(lock(&coordinator).subscription(1)?.balance, Amount::ONE);

    let player = Address::from_label("player");
    let events = lock(&raffle).events().clone();

    let outcome = EventAwait::new(&events, WinnerPicked::NAME)
        .timeout(config.event_timeout)
        .run(|| async {
            let mut raffle = lock(&raffle);
            raffle.enter_raffle(player, config.entrance_fee)?;
            let request_id = {
                let mut coordinator = lock(&coordinator);
                raffle.request_winner(&mut coordinator)?
            };
            assert_eq!(request_id, 1);
            assert_eq!(raffle.state(), RaffleState::Calculating);

            let words = lock(&coordinator).fulfill_random_words(request_id, &mut *raffle)?;
            assert_eq!(words.len(), 1);
            Ok::<_, anyhow::Error>(request_id)
        })
        .await?;

    let picked: WinnerPicked = outcome.event.decode()?;
    assert_eq!(picked.winner, player);
    assert_eq!(outcome.trigger_output, 1);

    // 1.0 - (0.25 + 1e9 * 100_000 base units)
    let balance = lock(&coordinator).subscription(1)?.balance;
    assert_eq!(balance, "0.7499".parse::<Amount>()?);

    let raffle = lock(&raffle);
    assert_eq!(raffle.state(), RaffleState::Open);
    assert_eq!(raffle.recent_winner(), Some(player));
    assert_eq!(raffle.winnings_of(&player), config.entrance_fee);
    Ok(())
}

#[tokio::test]
async fn second_fulfillment_fails_with_already_fulfilled() -> Result<()> {
    let (coordinator, config) = local_coordinator()?;
    let (raffle, _) = scenario::deploy_raffle(&coordinator, &config)?;

    let mut raffle = lock(&raffle);
    raffle.enter_raffle(Address::from_label("player"), config.entrance_fee)?;
    let mut coordinator = lock(&coordinator);
    let request_id = raffle.request_winner(&mut coordinator)?;

    coordinator.fulfill_random_words(request_id, &mut *raffle)?;
    let err = coordinator
        .fulfill_random_words(request_id, &mut *raffle)
        .unwrap_err();

    assert_eq!(err, VrfError::AlreadyFulfilled { request_id: 1 });
    assert_eq!(raffle.completed_rounds(), 1);
    Ok(())
}

#[tokio::test]
async fn unknown_ids_are_rejected() -> Result<()> {
    let (coordinator, config) = local_coordinator()?;
    let (raffle, _) = scenario::deploy_raffle(&coordinator, &config)?;

    let mut raffle = lock(&raffle);
    let mut coordinator = lock(&coordinator);
    let err = coordinator
        .request_random_words(raffle.address(), 99, 1, CALLBACK_GAS_LIMIT)
        .unwrap_err();
    assert_eq!(err, VrfError::UnknownSubscription { subscription_id: 99 });

    let err = coordinator
        .fulfill_random_words(42, &mut *raffle)
        .unwrap_err();
    assert_eq!(err, VrfError::UnknownRequest { request_id: 42 });
    Ok(())
}

#[tokio::test]
async fn oracle_fulfills_a_full_round() -> Result<()> {
    let (coordinator, config) = local_coordinator()?;
    let (raffle, _) = scenario::deploy_raffle(&coordinator, &config)?;

    let mut consumers = ConsumerDirectory::new();
    consumers.register(raffle.clone() as SharedConsumer);
    let oracle = oracle::start_oracle(coordinator.clone(), consumers, Duration::ZERO).await;

    let player = Address::from_label("player");
    let report =
        scenario::run_raffle_round(&coordinator, &raffle, player, config.event_timeout).await?;

    assert_eq!(report.request_id, 1);
    assert_eq!(report.winner, player);
    assert_eq!(report.snapshot.winnings_before, Amount::ZERO);
    assert_eq!(report.winnings_after, config.entrance_fee);

    let metrics = oracle.metrics().to_json();
    assert_eq!(metrics["requests_fulfilled"], 1);
    assert_eq!(metrics["requests_failed"], 0);
    Ok(())
}

#[tokio::test]
async fn oracle_catches_up_on_requests_made_before_it_started() -> Result<()> {
    let (coordinator, config) = local_coordinator()?;
    let (raffle, _) = scenario::deploy_raffle(&coordinator, &config)?;
    let player = Address::from_label("early");

    {
        let mut raffle = lock(&raffle);
        raffle.enter_raffle(player, config.entrance_fee)?;
        raffle.request_winner(&mut lock(&coordinator))?;
    }

    let events = lock(&raffle).events().clone();
    let mut consumers = ConsumerDirectory::new();
    consumers.register(raffle.clone() as SharedConsumer);

    let oracle_coordinator = coordinator.clone();

    let outcome = EventAwait::new(&events, WinnerPicked::NAME)
        .timeout(config.event_timeout)
        .run(move || async move {
            let oracle = oracle::start_oracle(oracle_coordinator, consumers, Duration::ZERO).await;
            Ok::<_, anyhow::Error>(oracle)
        })
        .await?;

    assert_eq!(outcome.event.decode::<WinnerPicked>()?.winner, player);
    assert!(!lock(&coordinator).pending_request_exists(1)?);
    Ok(())
}

#[tokio::test]
async fn unregistered_consumer_counts_as_failure() -> Result<()> {
    let (coordinator, config) = local_coordinator()?;
    let (raffle, _) = scenario::deploy_raffle(&coordinator, &config)?;

    let oracle =
        oracle::start_oracle(coordinator.clone(), ConsumerDirectory::new(), Duration::ZERO).await;
    let mut requests = lock(&coordinator).events().subscribe(RandomWordsRequested::NAME);

    {
        let mut raffle = lock(&raffle);
        raffle.enter_raffle(Address::from_label("player"), config.entrance_fee)?;
        raffle.request_winner(&mut lock(&coordinator))?;
    }
    assert!(requests.recv().await.is_some());

    tokio::time::timeout(Duration::from_secs(5), async {
        while oracle.metrics().requests_failed.load(Ordering::Relaxed) == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await?;

    let metrics = oracle.metrics().to_json();
    assert_eq!(metrics["requests_received"], 1);
    assert_eq!(metrics["requests_failed"], 1);
    assert!(lock(&coordinator).pending_request_exists(1)?);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn round_without_fulfillment_times_out() -> Result<()> {
    let (coordinator, config) = local_coordinator()?;
    let (raffle, _) = scenario::deploy_raffle(&coordinator, &config)?;

    let err = scenario::run_raffle_round(
        &coordinator,
        &raffle,
        Address::from_label("player"),
        Duration::from_secs(30),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<HarnessError>(),
        Some(HarnessError::EventTimeout { .. })
    ));
    assert_eq!(lock(&raffle).events().listener_count(WinnerPicked::NAME), 0);
    assert_eq!(lock(&raffle).state(), RaffleState::Calculating);
    Ok(())
}

#[tokio::test]
async fn live_staging_round_is_gated_by_network() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    if !config.network.staging_enabled() {
        info!(network = %config.network.name, "Skipping staging test on development network");
        return Ok(());
    }

    match resolve_coordinator(&config) {
        CoordinatorBinding::Live(address) => {
            assert_eq!(Some(address), config.network.vrf_coordinator);
            let mock = deploy_mocks("all", &config.network, config.fees, &config.vrf_seed_secret);
            assert!(mock.is_none());
            info!(
                network = %config.network.name,
                coordinator = %address,
                "Staging coordinator bound"
            );
        }
        CoordinatorBinding::Unbound => {
            assert!(config.network.vrf_coordinator.is_none());
            info!(
                network = %config.network.name,
                "No coordinator known, staging round skipped"
            );
        }
        CoordinatorBinding::Mock(_) => anyhow::bail!("mock deployed on live network"),
    }
    Ok(())
}

#[test]
fn staging_gate_is_closed_on_development_networks() -> Result<()> {
    let chains = ["hardhat".to_string(), "localhost".to_string()];
    assert!(!NetworkConfig::resolve("hardhat", &chains).staging_enabled());
    assert!(!NetworkConfig::resolve("localhost", &chains).staging_enabled());
    assert!(NetworkConfig::resolve("sepolia", &chains).staging_enabled());

    let sepolia =
        AppConfig::from_lookup(|key| (key == "NETWORK").then(|| "sepolia".to_string()))?;
    let expected: Address = "0x8103B0A8A00be2DDC778e6e7eaa21791Cd364625".parse()?;
    assert!(matches!(
        resolve_coordinator(&sepolia),
        CoordinatorBinding::Live(address) if address == expected
    ));
    Ok(())
}
