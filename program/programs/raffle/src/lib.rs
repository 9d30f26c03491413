use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use vrf_mock::{
    Address, Amount, ConsumerError, ContractEvent, EventEmitter, RandomWord, VrfConsumer,
    VrfCoordinatorMock, VrfError,
};

/// Raffle lifecycle. `Open` accepts entries; `Calculating` waits for randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaffleState {
    Open,
    Calculating,
}

/// Error codes for the raffle consumer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RaffleError {
    /// Entries and winner requests are only accepted while `Open`.
    #[error("raffle is not open")]
    NotOpen,
    #[error("entrance fee is {required}, sent {sent}")]
    InsufficientEntranceFee { sent: Amount, required: Amount },
    /// A winner was requested with nobody entered.
    #[error("raffle has no players")]
    NoPlayers,
    #[error("prize pot overflow")]
    PotOverflow,
    #[error(transparent)]
    Coordinator(#[from] VrfError),
}

/// Emitted when a player enters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleEnter {
    pub player: Address,
}

impl ContractEvent for RaffleEnter {
    const NAME: &'static str = "RaffleEnter";
}

/// Emitted when the raffle asks the coordinator for a winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedRaffleWinner {
    pub request_id: u64,
}

impl ContractEvent for RequestedRaffleWinner {
    const NAME: &'static str = "RequestedRaffleWinner";
}

/// Emitted once the randomness callback has settled a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerPicked {
    pub winner: Address,
}

impl ContractEvent for WinnerPicked {
    const NAME: &'static str = "WinnerPicked";
}

/// Deployment parameters.
#[derive(Debug, Clone, Copy)]
pub struct RaffleConfig {
    pub entrance_fee: Amount,
    /// Subscription the raffle charges its requests to.
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
}

/// A raffle that picks its winner with VRF randomness.
///
/// Demonstrates how a consumer integrates with the coordinator:
///
/// 1. **Enter**: players call [`Raffle::enter_raffle`] with at least the entrance fee.
/// 2. **Request**: [`Raffle::request_winner`] asks the coordinator for one
///    word and moves the raffle to `Calculating`.
/// 3. **Callback**: the coordinator delivers the word through
///    [`VrfConsumer::raw_fulfill_random_words`]; the winner takes the pot,
///    the raffle reopens and `WinnerPicked` is emitted.
pub struct Raffle {
    address: Address,
    coordinator: Address,
    config: RaffleConfig,
    state: RaffleState,
    players: Vec<Address>,
    pot: Amount,
    winnings: BTreeMap<Address, Amount>,
    recent_winner: Option<Address>,
    pending_request: Option<u64>,
    completed_rounds: u64,
    callback_gas_usage: u64,
    events: EventEmitter,
}

impl Raffle {
    pub const NUM_WORDS: u32 = 1;

    pub fn new(address: Address, coordinator: Address, config: RaffleConfig) -> Self {
        Self {
            address,
            coordinator,
            config,
            state: RaffleState::Open,
            players: Vec::new(),
            pot: Amount::ZERO,
            winnings: BTreeMap::new(),
            recent_winner: None,
            pending_request: None,
            completed_rounds: 0,
            callback_gas_usage: 0,
            events: EventEmitter::new(address),
        }
    }

    /// Enter the current round by paying `value`.
    pub fn enter_raffle(&mut self, player: Address, value: Amount) -> Result<(), RaffleError> {
        if self.state != RaffleState::Open {
            return Err(RaffleError::NotOpen);
        }
        if value < self.config.entrance_fee {
            return Err(RaffleError::InsufficientEntranceFee {
                sent: value,
                required: self.config.entrance_fee,
            });
        }

        self.pot = self.pot.checked_add(value).ok_or(RaffleError::PotOverflow)?;
        self.players.push(player);

        self.events.emit(&RaffleEnter { player });
        info!(raffle = %self.address, %player, players = self.players.len(), "Player entered");
        Ok(())
    }

    /// Close the round and request one random word for the draw.
    pub fn request_winner(
        &mut self,
        coordinator: &mut VrfCoordinatorMock,
    ) -> Result<u64, RaffleError> {
        if self.state != RaffleState::Open {
            return Err(RaffleError::NotOpen);
        }
        if self.players.is_empty() {
            return Err(RaffleError::NoPlayers);
        }

        let request_id = coordinator.request_random_words(
            self.address,
            self.config.subscription_id,
            Self::NUM_WORDS,
            self.config.callback_gas_limit,
        )?;

        self.state = RaffleState::Calculating;
        self.pending_request = Some(request_id);

        self.events.emit(&RequestedRaffleWinner { request_id });
        info!(raffle = %self.address, request_id, "Requested raffle winner");
        Ok(request_id)
    }

    /// Simulated gas the callback burns, for exercising the coordinator's gas limit.
    pub fn set_callback_gas_usage(&mut self, gas: u64) {
        self.callback_gas_usage = gas;
    }

    pub fn entrance_fee(&self) -> Amount {
        self.config.entrance_fee
    }

    pub fn state(&self) -> RaffleState {
        self.state
    }

    pub fn player(&self, index: usize) -> Option<Address> {
        self.players.get(index).copied()
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn recent_winner(&self) -> Option<Address> {
        self.recent_winner
    }

    /// Total prize credited to `player` across all rounds.
    pub fn winnings_of(&self, player: &Address) -> Amount {
        self.winnings.get(player).copied().unwrap_or_default()
    }

    pub fn completed_rounds(&self) -> u64 {
        self.completed_rounds
    }

    pub fn events(&self) -> &EventEmitter {
        &self.events
    }
}

impl VrfConsumer for Raffle {
    fn address(&self) -> Address {
        self.address
    }

    fn coordinator(&self) -> Address {
        self.coordinator
    }

    fn callback_gas_usage(&self, _num_words: usize) -> u64 {
        self.callback_gas_usage
    }

    fn fulfill_random_words(
        &mut self,
        request_id: u64,
        random_words: &[RandomWord],
    ) -> Result<(), ConsumerError> {
        if self.pending_request != Some(request_id) {
            return Err(ConsumerError::Reverted(format!(
                "unexpected request {request_id}"
            )));
        }
        let index = random_words
            .first()
            .and_then(|word| word.modulo(self.players.len() as u64))
            .ok_or_else(|| ConsumerError::Reverted("cannot draw a winner".into()))?;
        let winner = self.players[index as usize];

        let credited = self
            .winnings_of(&winner)
            .checked_add(self.pot)
            .ok_or_else(|| ConsumerError::Reverted("winnings overflow".into()))?;
        self.winnings.insert(winner, credited);

        self.pot = Amount::ZERO;
        self.players.clear();
        self.state = RaffleState::Open;
        self.recent_winner = Some(winner);
        self.pending_request = None;
        self.completed_rounds += 1;

        self.events.emit(&WinnerPicked { winner });
        info!(raffle = %self.address, request_id, %winner, "Winner picked");
        Ok(())
    }
}
