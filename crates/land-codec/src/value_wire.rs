// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`WireValue`]: the serde-serializable mirror of [`SnapshotValue`].
//!
//! `SnapshotValue` deliberately doesn't derive `Serialize`/`Deserialize`
//! (see its doc comment) because `Bytes` and `Array` are indistinguishable
//! under an untagged representation. `WireValue` resolves that by tagging
//! every variant explicitly — the same adjacently-tagged shape this crate
//! uses for [`crate::path_wire::WirePath`] — so one conversion serves both
//! the JSON and MessagePack encoders via plain `serde::Serialize`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use land_state::SnapshotValue;

/// Adjacently-tagged mirror of [`SnapshotValue`] for wire serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum WireValue {
    /// `SnapshotValue::Null`.
    #[serde(rename = "n")]
    Null,
    /// `SnapshotValue::Bool`.
    #[serde(rename = "b")]
    Bool(bool),
    /// `SnapshotValue::Int`.
    #[serde(rename = "i")]
    Int(i64),
    /// `SnapshotValue::Float`.
    #[serde(rename = "f")]
    Float(f64),
    /// `SnapshotValue::String`.
    #[serde(rename = "s")]
    Str(String),
    /// `SnapshotValue::Bytes`.
    #[serde(rename = "y")]
    Bytes(Vec<u8>),
    /// `SnapshotValue::Array`.
    #[serde(rename = "a")]
    Array(Vec<WireValue>),
    /// `SnapshotValue::Object`.
    #[serde(rename = "o")]
    Object(BTreeMap<String, WireValue>),
}

impl From<&SnapshotValue> for WireValue {
    fn from(value: &SnapshotValue) -> Self {
        match value {
            SnapshotValue::Null => Self::Null,
            SnapshotValue::Bool(b) => Self::Bool(*b),
            SnapshotValue::Int(i) => Self::Int(*i),
            SnapshotValue::Float(f) => Self::Float(*f),
            SnapshotValue::String(s) => Self::Str(s.clone()),
            SnapshotValue::Bytes(b) => Self::Bytes(b.clone()),
            SnapshotValue::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            SnapshotValue::Object(fields) => {
                Self::Object(fields.iter().map(|(k, v)| (k.clone(), Self::from(v))).collect())
            }
        }
    }
}

impl From<&WireValue> for SnapshotValue {
    fn from(value: &WireValue) -> Self {
        match value {
            WireValue::Null => Self::Null,
            WireValue::Bool(b) => Self::Bool(*b),
            WireValue::Int(i) => Self::Int(*i),
            WireValue::Float(f) => Self::Float(*f),
            WireValue::Str(s) => Self::String(s.clone()),
            WireValue::Bytes(b) => Self::Bytes(b.clone()),
            WireValue::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            WireValue::Object(fields) => {
                Self::Object(fields.iter().map(|(k, v)| (k.clone(), Self::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn bytes_and_array_round_trip_distinctly() {
        let bytes = SnapshotValue::Bytes(vec![1, 2, 3]);
        let array = SnapshotValue::Array(vec![SnapshotValue::Int(1), SnapshotValue::Int(2)]);

        let bytes_json = serde_json::to_string(&WireValue::from(&bytes)).expect("serialize");
        let array_json = serde_json::to_string(&WireValue::from(&array)).expect("serialize");
        assert_ne!(bytes_json, array_json);

        let decoded: WireValue = serde_json::from_str(&bytes_json).expect("deserialize");
        assert_eq!(SnapshotValue::from(&decoded), bytes);
    }
}
