// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Parallel encoding controller (`spec.md` §4.F "Parallel encoding
//! controller"). Purely the batching-size-and-concurrency policy; the
//! adapter owns actually running it.

/// Tunables governing whether and how broadly a sync flush fans out across
/// tasks. Maps directly to `land-config`'s `parallel_*` keys (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Whether parallel encoding is enabled at all.
    pub enabled: bool,
    /// Below this many recipients, flushes run serially regardless of
    /// `enabled`.
    pub min_parallel_count: usize,
    /// Recipients per batch task.
    pub batch_size: usize,
    /// Concurrent batch tasks below `high_threshold` recipients.
    pub low_cap: usize,
    /// Concurrent batch tasks at or above `high_threshold` recipients.
    pub high_cap: usize,
    /// Recipient count at which `high_cap` replaces `low_cap`.
    pub high_threshold: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self { enabled: true, min_parallel_count: 8, batch_size: 16, low_cap: 2, high_cap: 8, high_threshold: 64 }
    }
}

/// The batching decision for one flush of `recipient_count` players, given
/// whether the active encoder reports `SUPPORTS_PARALLEL`.
///
/// `spec.md` §4.F: "if `N < min_parallel_count`: serial. else if
/// `N < high_threshold`: `C = low_cap`. else: `C = high_cap`."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPlan {
    /// Encode every recipient on the calling task, in order.
    Serial,
    /// Partition into batches of `batch_size`, running at most
    /// `concurrency` batches at once.
    Parallel { batch_size: usize, concurrency: usize },
}

impl ParallelConfig {
    /// Chooses a [`BatchPlan`] for `recipient_count` recipients, given
    /// whether the active encoder supports parallel batching.
    #[must_use]
    pub const fn plan_for(self, recipient_count: usize, encoder_supports_parallel: bool) -> BatchPlan {
        if !self.enabled || !encoder_supports_parallel || recipient_count < self.min_parallel_count {
            return BatchPlan::Serial;
        }
        let concurrency = if recipient_count < self.high_threshold { self.low_cap } else { self.high_cap };
        BatchPlan::Parallel { batch_size: self.batch_size, concurrency }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn config() -> ParallelConfig {
        ParallelConfig { enabled: true, min_parallel_count: 8, batch_size: 16, low_cap: 2, high_cap: 8, high_threshold: 64 }
    }

    #[test]
    fn below_min_parallel_count_is_serial() {
        assert_eq!(config().plan_for(7, true), BatchPlan::Serial);
    }

    #[test]
    fn below_high_threshold_uses_low_cap() {
        assert_eq!(config().plan_for(10, true), BatchPlan::Parallel { batch_size: 16, concurrency: 2 });
    }

    #[test]
    fn at_or_above_high_threshold_uses_high_cap() {
        assert_eq!(config().plan_for(64, true), BatchPlan::Parallel { batch_size: 16, concurrency: 8 });
    }

    #[test]
    fn encoder_without_parallel_support_is_always_serial() {
        assert_eq!(config().plan_for(1000, false), BatchPlan::Serial);
    }
}
