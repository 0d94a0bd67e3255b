// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Replay driver: re-applies a recorded [`ReevaluationEntry`] stream and
//! compares recomputed hashes against the recorded ones.

use crate::hash::StateHash;
use crate::record::ReevaluationEntry;

/// Result of replaying one recorded tick.
///
/// Emitted to all subscribers of a replay session (`spec.md` §4.E).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ReplayTickEvent {
    /// Tick this event covers.
    pub tick: u64,
    /// Whether the recomputed hash matched the recorded one.
    pub is_match: bool,
    /// The hash recorded during the original run.
    pub expected_hash: StateHash,
    /// The hash recomputed by replaying the same action envelopes.
    pub actual_hash: StateHash,
}

/// Applies one tick's recorded action envelopes and returns the recomputed
/// broadcast-projection hash.
///
/// This is the seam a replay session plugs the keeper into: replay never
/// executes a tick's own logic from scratch, it reapplies the exact
/// envelopes that were recorded (CUR-002 in spirit — replay never invents
/// inputs, it only reruns recorded ones).
///
/// # Errors
/// Returns an implementation-defined error if the envelopes cannot be
/// applied (e.g. a rule now panics on input that used to be valid).
pub trait TickReplayer<A> {
    /// Error type returned when a tick's envelopes cannot be applied.
    type Error;

    /// Applies `envelopes` for `tick` to this replayer's state and returns
    /// the resulting canonical broadcast-projection hash.
    fn apply_tick(&mut self, tick: u64, envelopes: &[A]) -> Result<StateHash, Self::Error>;
}

/// Replays a recorded reevaluation record against `replayer`, comparing the
/// recomputed hash to the recorded one tick-by-tick.
///
/// Stops at the first tick `replayer` fails to apply; every tick replayed
/// before that point still gets a [`ReplayTickEvent`], matching or not.
///
/// # Errors
/// Returns `replayer`'s error if a tick's envelopes cannot be applied.
pub fn replay<A, E, R>(
    record: &[ReevaluationEntry<A, E>],
    replayer: &mut R,
) -> Result<Vec<ReplayTickEvent>, R::Error>
where
    R: TickReplayer<A>,
{
    let mut events = Vec::with_capacity(record.len());
    for entry in record {
        let actual_hash = replayer.apply_tick(entry.tick, &entry.applied_envelopes)?;
        events.push(ReplayTickEvent {
            tick: entry.tick,
            is_match: actual_hash == entry.state_hash,
            expected_hash: entry.state_hash,
            actual_hash,
        });
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::hash::canonical_hash;
    use land_state::SnapshotValue;
    use std::collections::BTreeMap;

    fn state_hash(hp: i64) -> StateHash {
        let mut fields = BTreeMap::new();
        fields.insert("hp".to_string(), SnapshotValue::Int(hp));
        canonical_hash(&SnapshotValue::Object(fields))
    }

    struct FaithfulReplayer {
        hp: i64,
    }

    impl TickReplayer<i64> for FaithfulReplayer {
        type Error = std::convert::Infallible;

        fn apply_tick(&mut self, _tick: u64, envelopes: &[i64]) -> Result<StateHash, Self::Error> {
            for delta in envelopes {
                self.hp += delta;
            }
            Ok(state_hash(self.hp))
        }
    }

    #[test]
    fn faithful_replay_matches_every_tick() {
        let record = vec![
            ReevaluationEntry {
                tick: 0,
                applied_envelopes: vec![-10],
                state_hash: state_hash(90),
                emitted_events: Vec::<()>::new(),
            },
            ReevaluationEntry {
                tick: 1,
                applied_envelopes: vec![5],
                state_hash: state_hash(95),
                emitted_events: Vec::<()>::new(),
            },
        ];
        let mut replayer = FaithfulReplayer { hp: 100 };
        let events = replay(&record, &mut replayer).expect("replay succeeds");

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.is_match));
        assert_eq!(events[0].tick, 0);
        assert_eq!(events[1].tick, 1);
    }

    #[test]
    fn divergent_replay_reports_mismatch_without_aborting() {
        let record = vec![ReevaluationEntry {
            tick: 0,
            applied_envelopes: vec![-10],
            state_hash: state_hash(999), // wrong on purpose
            emitted_events: Vec::<()>::new(),
        }];
        let mut replayer = FaithfulReplayer { hp: 100 };
        let events = replay(&record, &mut replayer).expect("replay succeeds");

        assert_eq!(events.len(), 1);
        assert!(!events[0].is_match);
        assert_eq!(events[0].actual_hash, state_hash(90));
    }
}
