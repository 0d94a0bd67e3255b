// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`BoundedRingRecorder`]: an in-memory [`ReevaluationRunnerService`]
//! that keeps all history or prunes to a sliding window.

use crate::record::{ReevalError, ReevaluationEntry, ReevaluationRunnerService};

/// How much history a [`BoundedRingRecorder`] keeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep every recorded tick indefinitely.
    #[default]
    KeepAll,
    /// Keep only the most recent `window` ticks; older ones are pruned.
    KeepRecent {
        /// Number of ticks to retain. Must be >= 1.
        window: usize,
    },
}

/// In-memory reevaluation recorder backed by a `Vec`.
///
/// Appends are append-only against a monotonic tick counter that keeps
/// advancing even as old entries are pruned under [`RetentionPolicy::KeepRecent`]
/// — pruning shrinks [`cumulative_record`](ReevaluationRunnerService::cumulative_record)
/// without resetting the expected next tick.
#[derive(Debug, Clone)]
pub struct BoundedRingRecorder<A, E> {
    policy: RetentionPolicy,
    next_tick: u64,
    entries: Vec<ReevaluationEntry<A, E>>,
}

impl<A, E> BoundedRingRecorder<A, E> {
    /// Creates an empty recorder under the given retention policy.
    #[must_use]
    pub const fn new(policy: RetentionPolicy) -> Self {
        Self {
            policy,
            next_tick: 0,
            entries: Vec::new(),
        }
    }

    /// The next tick this recorder expects to append.
    #[must_use]
    pub const fn next_tick(&self) -> u64 {
        self.next_tick
    }
}

impl<A, E> ReevaluationRunnerService<A, E> for BoundedRingRecorder<A, E> {
    fn record(&mut self, entry: ReevaluationEntry<A, E>) -> Result<(), ReevalError> {
        if entry.tick != self.next_tick {
            return Err(ReevalError::TickGap {
                expected: self.next_tick,
                got: entry.tick,
            });
        }
        self.entries.push(entry);
        self.next_tick += 1;

        if let RetentionPolicy::KeepRecent { window } = self.policy {
            while self.entries.len() > window {
                self.entries.remove(0);
            }
        }
        Ok(())
    }

    fn cumulative_record(&self) -> &[ReevaluationEntry<A, E>] {
        &self.entries
    }
}
