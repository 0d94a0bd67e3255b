// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use land_reeval::{
    canonical_hash, replay, BoundedRingRecorder, ReevaluationEntry, ReevaluationRunnerService,
    RetentionPolicy, TickReplayer,
};
use land_state::SnapshotValue;
use std::collections::BTreeMap;

fn hp_snapshot(hp: i64) -> SnapshotValue {
    let mut fields = BTreeMap::new();
    fields.insert("hp".to_string(), SnapshotValue::Int(hp));
    SnapshotValue::Object(fields)
}

struct HpWorkload {
    hp: i64,
}

impl TickReplayer<i64> for HpWorkload {
    type Error = std::convert::Infallible;

    fn apply_tick(
        &mut self,
        _tick: u64,
        envelopes: &[i64],
    ) -> Result<land_reeval::StateHash, Self::Error> {
        for delta in envelopes {
            self.hp += delta;
        }
        Ok(canonical_hash(&hp_snapshot(self.hp)))
    }
}

/// `spec.md` §8 scenario 6: record a 100-tick deterministic workload, replay
/// it from the same initial state, and every `is_match` flag is `true`.
#[test]
fn replay_hash_match_over_one_hundred_ticks() {
    let mut recorder: BoundedRingRecorder<i64, ()> =
        BoundedRingRecorder::new(RetentionPolicy::KeepAll);
    let mut live = HpWorkload { hp: 100 };

    for tick in 0..100u64 {
        let delta = if tick % 2 == 0 { 1 } else { -1 };
        let state_hash = live.apply_tick(tick, &[delta]).expect("infallible");
        recorder
            .record(ReevaluationEntry {
                tick,
                applied_envelopes: vec![delta],
                state_hash,
                emitted_events: vec![],
            })
            .expect("append in order");
    }

    let mut replayed = HpWorkload { hp: 100 };
    let events = replay(recorder.cumulative_record(), &mut replayed).expect("replay succeeds");

    assert_eq!(events.len(), 100);
    assert!(events.iter().all(|event| event.is_match));
}
