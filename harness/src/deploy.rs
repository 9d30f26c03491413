//! Mock deployment step.
//!
//! Addressed by tag like a deploy script: `"mocks"` or `"all"` select it.
//! The network decision arrives as a flag on [`NetworkConfig`]; the
//! coordinator itself never sees network names.

use tracing::info;
use vrf_mock::{Address, FeeSchedule, VrfCoordinatorMock};

use crate::config::{AppConfig, NetworkConfig};

/// Tags that select the mock deployment.
pub const DEPLOY_TAGS: [&str; 2] = ["all", "mocks"];

/// Deploy the coordinator mock if `tag` selects this step and the network is
/// a development network. Returns `None` otherwise.
pub fn deploy_mocks(
    tag: &str,
    network: &NetworkConfig,
    fees: FeeSchedule,
    seed_secret: &[u8],
) -> Option<VrfCoordinatorMock> {
    if !DEPLOY_TAGS.contains(&tag) {
        return None;
    }
    if !network.development {
        info!(network = %network.name, "Live network, skipping mock deployment");
        return None;
    }

    info!(network = %network.name, "Local network detected! Deploying mocks");
    let coordinator = VrfCoordinatorMock::new(fees, seed_secret);
    info!(coordinator = %coordinator.address(), "Mocks deployed");
    Some(coordinator)
}

/// Which coordinator a run talks to.
pub enum CoordinatorBinding {
    /// Freshly deployed in-process mock.
    Mock(VrfCoordinatorMock),
    /// A real coordinator on a live network.
    Live(Address),
    /// Live network with no known coordinator.
    Unbound,
}

/// Run the `"all"` deployment for the configured network.
pub fn resolve_coordinator(config: &AppConfig) -> CoordinatorBinding {
    if let Some(mock) = deploy_mocks("all", &config.network, config.fees, &config.vrf_seed_secret) {
        return CoordinatorBinding::Mock(mock);
    }
    match config.network.vrf_coordinator {
        Some(address) => CoordinatorBinding::Live(address),
        None => CoordinatorBinding::Unbound,
    }
}
