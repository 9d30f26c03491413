//! End-to-end raffle round against the coordinator mock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use raffle::{Raffle, RaffleConfig, RaffleState, WinnerPicked};
use tracing::info;
use vrf_mock::{Address, Amount, ContractEvent, VrfConsumer};

use crate::await_event::EventAwait;
use crate::config::AppConfig;
use crate::{SharedCoordinator, lock};

/// Subscribe, fund and deploy a raffle registered as the subscription's consumer.
///
/// Returns the raffle and its subscription id.
pub fn deploy_raffle(
    coordinator: &SharedCoordinator,
    config: &AppConfig,
) -> Result<(Arc<Mutex<Raffle>>, u64)> {
    let mut coordinator = lock(coordinator);

    let subscription_id = coordinator.create_subscription();
    coordinator
        .fund_subscription(subscription_id, config.subscription_fund_amount)
        .context("failed to fund raffle subscription")?;

    let raffle = Raffle::new(
        Address::from_label("Raffle"),
        coordinator.address(),
        RaffleConfig {
            entrance_fee: config.entrance_fee,
            subscription_id,
            callback_gas_limit: config.callback_gas_limit,
        },
    );
    coordinator
        .add_consumer(subscription_id, raffle.address())
        .context("failed to register raffle as consumer")?;

    info!(
        raffle = %raffle.address(),
        subscription_id,
        funded = %config.subscription_fund_amount,
        "Raffle deployed"
    );

    Ok((Arc::new(Mutex::new(raffle)), subscription_id))
}

/// Raffle state captured before the round is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub winnings_before: Amount,
    pub completed_rounds_before: u64,
}

#[derive(Debug, Clone)]
pub struct RoundReport {
    pub request_id: u64,
    pub winner: Address,
    pub snapshot: RoundSnapshot,
    pub winnings_after: Amount,
    pub elapsed: Duration,
}

/// Enter `player` alone, request a winner and wait for `WinnerPicked`.
///
/// Someone must fulfill the request while this waits, normally the oracle
/// from [`crate::oracle::start_oracle`]. Resolves only if the round settled
/// as expected: the sole player won the whole pot and the raffle reopened
/// empty.
pub async fn run_raffle_round(
    coordinator: &SharedCoordinator,
    raffle: &Arc<Mutex<Raffle>>,
    player: Address,
    timeout: Duration,
) -> Result<RoundReport> {
    let (events, entrance_fee) = {
        let raffle = lock(raffle);
        (raffle.events().clone(), raffle.entrance_fee())
    };

    let outcome = EventAwait::new(&events, WinnerPicked::NAME)
        .timeout(timeout)
        .run_and_validate(
            || {
                let raffle = lock(raffle);
                RoundSnapshot {
                    winnings_before: raffle.winnings_of(&player),
                    completed_rounds_before: raffle.completed_rounds(),
                }
            },
            || async move {
                let mut raffle = lock(raffle);
                raffle.enter_raffle(player, entrance_fee)?;
                let mut coordinator = lock(coordinator);
                let request_id = raffle.request_winner(&mut coordinator)?;
                Ok::<_, anyhow::Error>(request_id)
            },
            |event, snapshot, request_id| {
                let picked: WinnerPicked = event.decode()?;
                let raffle = lock(raffle);

                ensure!(
                    picked.winner == player,
                    "winner {} is not the only player {player}",
                    picked.winner
                );
                ensure!(raffle.player(0).is_none(), "players were not reset");
                ensure!(raffle.state() == RaffleState::Open, "raffle did not reopen");
                ensure!(
                    raffle.completed_rounds() == snapshot.completed_rounds_before + 1,
                    "round counter did not advance"
                );

                let expected = snapshot
                    .winnings_before
                    .checked_add(entrance_fee)
                    .context("winnings overflow")?;
                let winnings_after = raffle.winnings_of(&player);
                ensure!(
                    winnings_after == expected,
                    "winner balance is {winnings_after}, expected {expected}"
                );

                let fulfilled = lock(coordinator).request(*request_id)?.fulfilled;
                ensure!(fulfilled, "request {request_id} is still pending");

                Ok(winnings_after)
            },
        )
        .await?;

    info!(
        request_id = outcome.trigger_output,
        winner = %player,
        elapsed = ?outcome.elapsed,
        "Raffle round settled"
    );

    Ok(RoundReport {
        request_id: outcome.trigger_output,
        winner: player,
        snapshot: outcome.captured,
        winnings_after: outcome.validated,
        elapsed: outcome.elapsed,
    })
}
