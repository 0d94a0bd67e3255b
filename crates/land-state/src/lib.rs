// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-land state tree, field sync policies, dirty tracking, and the
//! opcode diff engine.
//!
//! The tree shape is fixed at land-type registration ([`tree::NodeSchema`]);
//! only leaf values and map/array cardinalities mutate at runtime. Mutators
//! record changes into a [`dirty::DirtyTracker`], which a sync flush drains
//! into an ordered [`dirty::Op`] list — the wire-agnostic diff that
//! `land-codec` encodes.

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::missing_errors_doc
)]

pub mod dirty;
pub mod path;
pub mod tree;
pub mod value;

pub use dirty::{DirtyTracker, FieldDirtyState, KeyDelta, Op};
pub use path::{fnv1a32, FieldPath, PathHashCollision, PathHashTable, PathSegment};
pub use tree::{snapshot_broadcast, NodeSchema, StateNode, SyncPolicy};
pub use value::SnapshotValue;
