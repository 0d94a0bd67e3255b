// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-player dirty tracking (`spec.md` §4.F "Per-player dirty tracking").
//!
//! A single broadcast projection is shared by every bound player in this
//! land type (`land-state`'s `SyncPolicy` has no per-player variants), so
//! every player's pending diff accumulates the same ops; what differs is
//! only when each player's diff was last cleared — a player who joined
//! mid-stream has an empty pending set and gets a `firstSync` instead.

use land_state::Op;

/// One player's accumulated-since-last-flush state.
#[derive(Debug, Clone, Default)]
pub struct DirtyView {
    /// Ops accumulated since the last successful flush for this player.
    pub pending: Vec<Op>,
    /// `true` until the player's first successful flush (`firstSync`) has
    /// gone out; while `true`, `pending` is ignored and a full snapshot is
    /// sent instead.
    pub needs_first_sync: bool,
}

impl DirtyView {
    /// A freshly joined player's view: no pending ops, awaiting `firstSync`.
    #[must_use]
    pub fn joined() -> Self {
        Self { pending: Vec::new(), needs_first_sync: true }
    }

    /// Appends `ops` to this player's pending diff, in order.
    pub fn merge(&mut self, ops: &[Op]) {
        self.pending.extend_from_slice(ops);
    }

    /// Clears the pending diff after a successful flush. Leaves
    /// `needs_first_sync` untouched — only [`DirtyView::mark_first_synced`]
    /// clears that.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Marks that this player's `firstSync` has gone out.
    pub fn mark_first_synced(&mut self) {
        self.needs_first_sync = false;
    }
}
