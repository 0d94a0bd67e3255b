// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`SnapshotValue`]: the canonical cross-codec intermediate value.

use std::collections::BTreeMap;

/// A tagged sum over every shape a state-tree leaf or subtree snapshot can
/// take. This is the one value type every codec (JSON, MessagePack) and
/// every hash (reevaluation) agrees on; nothing downstream ever matches on
/// a codec-specific representation.
///
/// This type intentionally does not derive `serde::{Serialize, Deserialize}`
/// itself: `Bytes` and `Array` would be indistinguishable to an untagged
/// JSON/MessagePack representation once serialized, and each wire codec
/// needs to map this sum onto a different native shape anyway (MessagePack
/// has a real binary type; JSON does not). `land-codec` owns that mapping
/// explicitly per encoder.
///
/// `Object` uses a [`BTreeMap`] rather than insertion-ordered storage so
/// that two snapshots built from the same logical state always serialize
/// identically regardless of the order fields were set in — the schema
/// endpoint's `sortedKeys` contract (see `spec.md` §6) depends on this.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotValue {
    /// Absence of a value.
    Null,
    /// Boolean leaf.
    Bool(bool),
    /// 64-bit signed integer leaf.
    Int(i64),
    /// 64-bit float leaf.
    Float(f64),
    /// UTF-8 string leaf.
    String(String),
    /// Raw byte string leaf.
    Bytes(Vec<u8>),
    /// Ordered array of values.
    Array(Vec<SnapshotValue>),
    /// Keyed object of values, sorted by key.
    Object(BTreeMap<String, SnapshotValue>),
}

impl SnapshotValue {
    /// Returns `true` if this value is [`SnapshotValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrows this value as an object map, if it is one.
    #[must_use]
    pub fn as_object(&self) -> Option<&BTreeMap<String, SnapshotValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Borrows this value as an array, if it is one.
    #[must_use]
    pub fn as_array(&self) -> Option<&[SnapshotValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for SnapshotValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SnapshotValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for SnapshotValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for SnapshotValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for SnapshotValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<Vec<u8>> for SnapshotValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}
