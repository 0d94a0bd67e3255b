// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reevaluation recording and replay for a LandKeeper land.
//!
//! After each tick the keeper hashes the broadcast projection
//! ([`canonical_hash`]) and appends an [`ReevaluationEntry`] to a
//! [`ReevaluationRunnerService`]. A replay session later reapplies the
//! recorded action envelopes through a [`TickReplayer`] and compares the
//! recomputed hash to the recorded one, tick-by-tick, via [`replay`].

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

mod hash;
mod record;
mod recorder;
mod replay;

pub use hash::{canonical_hash, StateHash};
pub use record::{ReevalError, ReevaluationEntry, ReevaluationRunnerService};
pub use recorder::{BoundedRingRecorder, RetentionPolicy};
pub use replay::{replay, ReplayTickEvent, TickReplayer};
