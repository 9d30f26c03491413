//! Application configuration loaded from environment variables.
//!
//! All optional: `NETWORK`, `DEVELOPMENT_CHAINS`, `BASE_FEE`, `GAS_PRICE_LINK`,
//!               `VRF_SEED_SECRET`, `SUBSCRIPTION_FUND_AMOUNT`, `ENTRANCE_FEE`,
//!               `CALLBACK_GAS_LIMIT`, `EVENT_TIMEOUT_MS`, `FULFILLMENT_DELAY_MS`

use std::time::Duration;

use anyhow::{Context, Result};
use vrf_mock::{Address, Amount, FeeSchedule};

/// Flat request fee charged by the mock, in whole units.
pub const DEFAULT_BASE_FEE: &str = "0.25";
/// Base units per gas; derived from the gas price of the chain being mocked.
pub const DEFAULT_GAS_PRICE_LINK: u128 = 1_000_000_000;

const DEFAULT_NETWORK: &str = "hardhat";
const DEFAULT_DEVELOPMENT_CHAINS: &str = "hardhat,localhost";

/// Live coordinators by network name.
const LIVE_COORDINATORS: &[(&str, &str)] = &[
    ("sepolia", "0x8103B0A8A00be2DDC778e6e7eaa21791Cd364625"),
    ("goerli", "0x2Ca8E0C643bDe4C2E08ab1fA0da3401AdAD7734D"),
];

/// What the harness knows about the network it runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: String,
    /// Local/test network: mocks are deployed and staging runs are skipped.
    pub development: bool,
    /// Address of a real coordinator, for live networks that have one.
    pub vrf_coordinator: Option<Address>,
}

impl NetworkConfig {
    /// Resolve `name` against the development list and the live coordinator table.
    pub fn resolve(name: &str, development_chains: &[String]) -> Self {
        let development = development_chains.iter().any(|chain| chain == name);
        let vrf_coordinator = LIVE_COORDINATORS
            .iter()
            .find(|(network, _)| *network == name)
            .and_then(|(_, address)| address.parse().ok());

        Self {
            name: name.to_string(),
            development,
            vrf_coordinator: if development { None } else { vrf_coordinator },
        }
    }

    /// Staging runs only make sense against live, non-mock deployments.
    pub fn staging_enabled(&self) -> bool {
        !self.development
    }
}

/// Application configuration for the harness binary and scenarios.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub network: NetworkConfig,
    /// Pricing the mock coordinator is deployed with.
    pub fees: FeeSchedule,
    /// Key for the mock's randomness generator.
    pub vrf_seed_secret: Vec<u8>,
    /// Amount a scenario funds its subscription with.
    pub subscription_fund_amount: Amount,
    pub entrance_fee: Amount,
    pub callback_gas_limit: u32,
    /// Bound on waiting for a completion event.
    pub event_timeout: Duration,
    /// Simulated off-chain delay before the oracle fulfills.
    pub fulfillment_delay: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let network_name = lookup("NETWORK").unwrap_or_else(|| DEFAULT_NETWORK.into());
        let development_chains: Vec<String> = lookup("DEVELOPMENT_CHAINS")
            .unwrap_or_else(|| DEFAULT_DEVELOPMENT_CHAINS.into())
            .split(',')
            .map(|chain| chain.trim().to_string())
            .filter(|chain| !chain.is_empty())
            .collect();
        let network = NetworkConfig::resolve(&network_name, &development_chains);

        let base_fee = parse_amount(&lookup, "BASE_FEE", DEFAULT_BASE_FEE)?;
        let gas_price_link = match lookup("GAS_PRICE_LINK") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid GAS_PRICE_LINK: {raw}"))?,
            None => DEFAULT_GAS_PRICE_LINK,
        };

        let vrf_seed_secret = lookup("VRF_SEED_SECRET")
            .unwrap_or_else(|| "local-vrf-mock".into())
            .into_bytes();

        let subscription_fund_amount = parse_amount(&lookup, "SUBSCRIPTION_FUND_AMOUNT", "1.0")?;
        let entrance_fee = parse_amount(&lookup, "ENTRANCE_FEE", "0.01")?;

        let callback_gas_limit = lookup("CALLBACK_GAS_LIMIT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(500_000);

        let event_timeout_ms = lookup("EVENT_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(300_000);

        let fulfillment_delay_ms = lookup("FULFILLMENT_DELAY_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        Ok(Self {
            network,
            fees: FeeSchedule::new(base_fee, gas_price_link),
            vrf_seed_secret,
            subscription_fund_amount,
            entrance_fee,
            callback_gas_limit,
            event_timeout: Duration::from_millis(event_timeout_ms),
            fulfillment_delay: Duration::from_millis(fulfillment_delay_ms),
        })
    }

    /// Defaults for the local `hardhat` network.
    pub fn local() -> Result<Self> {
        Self::from_lookup(|_| None)
    }
}

fn parse_amount(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<Amount> {
    let raw = lookup(key).unwrap_or_else(|| default.into());
    raw.parse()
        .with_context(|| format!("invalid {key}: {raw}"))
}
