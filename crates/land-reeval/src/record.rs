// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`ReevaluationEntry`], the append-only per-tick record, and the
//! [`ReevaluationRunnerService`] storage seam.

use crate::hash::StateHash;

/// One tick's worth of recorded provenance.
///
/// Generic over the action-envelope type `A` and the server-event type `E`
/// so this crate has no dependency on the keeper's concrete types — the
/// keeper fills these in when it records, and again when it replays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReevaluationEntry<A, E> {
    /// Tick this entry covers.
    pub tick: u64,
    /// Action envelopes applied during this tick, in application order.
    pub applied_envelopes: Vec<A>,
    /// Canonical hash of the broadcast projection after the tick completed.
    pub state_hash: StateHash,
    /// Server events emitted during this tick.
    pub emitted_events: Vec<E>,
}

/// Errors raised while appending to a [`ReevaluationRunnerService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReevalError {
    /// The appended tick does not equal the current record length
    /// (append-only, no gaps, no overwrites).
    #[error("tick gap: expected tick {expected}, got {got}")]
    TickGap {
        /// The tick that was expected (current record length).
        expected: u64,
        /// The tick that was provided.
        got: u64,
    },
}

/// Storage seam for a land's reevaluation record.
///
/// Implementations choose how much history to retain and where — a bounded
/// in-memory ring ([`BoundedRingRecorder`](crate::BoundedRingRecorder)) or
/// durable storage. The keeper holds one recorder per land and calls
/// [`record`](Self::record) once per completed tick.
pub trait ReevaluationRunnerService<A, E> {
    /// Appends one tick's entry to the record.
    ///
    /// # Errors
    /// Returns [`ReevalError::TickGap`] if `entry.tick` does not equal the
    /// current record length.
    fn record(&mut self, entry: ReevaluationEntry<A, E>) -> Result<(), ReevalError>;

    /// Returns the cumulative record retained so far, oldest first.
    fn cumulative_record(&self) -> &[ReevaluationEntry<A, E>];

    /// Number of ticks currently retained (not the land's current tick
    /// number, since bounded recorders prune).
    fn len(&self) -> usize {
        self.cumulative_record().len()
    }

    /// Returns `true` if no ticks are retained.
    fn is_empty(&self) -> bool {
        self.cumulative_record().is_empty()
    }
}
