// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dirty tracking and the opcode diff engine.
//!
//! Mutators record one [`Op`] per writable field they touch, in the order
//! they touch it. A sync flush takes the accumulated ops as-is: the tracker
//! is an ordered event log, not a recomputed tree diff, so "insertion order
//! of operations, not of keys" (`spec.md` §4.C) falls out of `Vec` push
//! order for free.

use std::collections::BTreeMap;

use crate::path::FieldPath;
use crate::value::SnapshotValue;

/// Per-field dirty classification (`spec.md` §4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDirtyState {
    /// No pending change.
    Clean,
    /// The whole field was replaced wholesale.
    Replaced,
    /// A descendant of the field changed; the field itself was not replaced.
    Mutated,
}

/// Per-key delta classification for maps and arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyDelta {
    /// A new key was inserted with this value.
    Added(SnapshotValue),
    /// An existing key was removed.
    Removed,
    /// An existing key's value was replaced wholesale.
    Replaced(SnapshotValue),
    /// An existing key's subtree was mutated in place.
    Mutated,
}

/// One opcode in a diff (`spec.md` §4.C wire opcode table).
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Replace the leaf or subtree at `path` with `value`.
    Set {
        /// Target path.
        path: FieldPath,
        /// Replacement value.
        value: SnapshotValue,
    },
    /// Remove the map/array entry at `path`.
    Del {
        /// Target path; its trailing segment is the removed key/index.
        path: FieldPath,
    },
    /// Insert `value` into the ordered array/map at `path`.
    Ins {
        /// Target path; its trailing segment is the inserted key/index.
        path: FieldPath,
        /// Inserted value.
        value: SnapshotValue,
    },
    /// Apply `sub_ops` to the subtree at `path` (compact encoding for a
    /// cluster of changes under one composite).
    Patch {
        /// Subtree root.
        path: FieldPath,
        /// Ops relative to `path`.
        sub_ops: Vec<Op>,
    },
}

impl Op {
    /// The path this op targets.
    #[must_use]
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::Set { path, .. } | Self::Del { path } | Self::Ins { path, .. } | Self::Patch { path, .. } => path,
        }
    }
}

/// Accumulates [`Op`]s produced by mutators between sync flushes.
///
/// Reset is atomic with respect to flush outcome: call [`DirtyTracker::take`]
/// only once a flush has actually succeeded. A failed flush should instead
/// call [`DirtyTracker::ops`] again on the next attempt — the tracker is
/// left untouched.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    ops: Vec<Op>,
    states: BTreeMap<String, FieldDirtyState>,
}

impl DirtyTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a `SET` at `path`, classifying the field as [`FieldDirtyState::Replaced`].
    pub fn record_set(&mut self, path: FieldPath, value: SnapshotValue) {
        self.states.insert(path.to_literal_string(), FieldDirtyState::Replaced);
        self.ops.push(Op::Set { path, value });
    }

    /// Records a `DEL` at `path`.
    pub fn record_del(&mut self, path: FieldPath) {
        self.states.insert(path.to_literal_string(), FieldDirtyState::Replaced);
        self.ops.push(Op::Del { path });
    }

    /// Records an `INS` at `path`.
    pub fn record_ins(&mut self, path: FieldPath, value: SnapshotValue) {
        self.states.insert(path.to_literal_string(), FieldDirtyState::Replaced);
        self.ops.push(Op::Ins { path, value });
    }

    /// Records a `PATCH` at `path`, classifying the field as
    /// [`FieldDirtyState::Mutated`] (its subtree changed, but the field
    /// itself was not wholesale replaced).
    pub fn record_patch(&mut self, path: FieldPath, sub_ops: Vec<Op>) {
        self.states.insert(path.to_literal_string(), FieldDirtyState::Mutated);
        self.ops.push(Op::Patch { path, sub_ops });
    }

    /// Dirty classification recorded for `path`, or [`FieldDirtyState::Clean`]
    /// if nothing has touched it since the last flush.
    #[must_use]
    pub fn state_of(&self, path: &FieldPath) -> FieldDirtyState {
        self.states
            .get(&path.to_literal_string())
            .copied()
            .unwrap_or(FieldDirtyState::Clean)
    }

    /// `true` if no ops have been recorded since the last flush.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Borrows the accumulated ops in recorded order, without consuming them.
    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Consumes and clears the accumulated ops. Call only after a sync
    /// flush using [`DirtyTracker::ops`] has succeeded.
    pub fn take(&mut self) -> Vec<Op> {
        self.states.clear();
        std::mem::take(&mut self.ops)
    }
}
