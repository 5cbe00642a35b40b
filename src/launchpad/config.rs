//! Launchpad configuration

use crate::token::DEFAULT_HISTORY_LIMIT;
use serde::{Deserialize, Serialize};

/// Tunables for a launchpad instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchpadConfig {
    /// Reject trades whose price rounds down to zero native units.
    /// Off by default: such trades settle with a payment of 0.
    pub reject_dust_trades: bool,
    /// Transfers kept in each token's history
    pub transfer_history_limit: usize,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            reject_dust_trades: false,
            transfer_history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}
