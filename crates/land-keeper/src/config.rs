// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-keeper tunables. Deliberately separate from `land-config`'s
//! `LandConfig`: that crate owns process-wide *loading* (files, defaults);
//! this one owns the handful of values one keeper instance actually reads on
//! its hot path, so this crate never depends on a config-storage backend.

use std::time::Duration;

/// Tunables for one [`crate::keeper::LandKeeperHandle`] (`spec.md` §4.E, §5, §6).
#[derive(Debug, Clone, PartialEq)]
pub struct KeeperConfig {
    /// Tick loop period (`P_tick`). `spec.md` §4.E example: 50ms.
    pub tick_period: Duration,
    /// Default command deadline. `spec.md` §5 default: `2 * tick_period`.
    pub command_timeout: Duration,
    /// Pending-tick queue depth above which oldest ticks are coalesced.
    pub n_max_pending_ticks: usize,
    /// Players a land accepts before `on_join` returns `capacity_exceeded`.
    pub max_players: usize,
    /// Per-session actions allowed per [`KeeperConfig::rate_limit_window`]
    /// before `handle_action` returns `rate_limited`.
    pub rate_limit_actions: u32,
    /// Window `rate_limit_actions` is measured over.
    pub rate_limit_window: Duration,
    /// Grace period after last leave before the keeper begins draining.
    pub join_grace: Duration,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        const TICK_PERIOD_MS: u64 = 50;
        Self {
            tick_period: Duration::from_millis(TICK_PERIOD_MS),
            command_timeout: Duration::from_millis(TICK_PERIOD_MS * 2),
            n_max_pending_ticks: 8,
            max_players: 64,
            rate_limit_actions: 60,
            rate_limit_window: Duration::from_secs(1),
            join_grace: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn default_command_timeout_is_double_tick_period() {
        let config = KeeperConfig::default();
        assert_eq!(config.command_timeout, config.tick_period * 2);
    }
}
