// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wire representation of [`Op`] — the `[op_code, path, value?]` tuple
//! from `spec.md` §6.

use serde::{Deserialize, Serialize};

use land_state::{Op, PathHashTable};

use crate::error::CodecError;
use crate::path_wire::{encode_path, PathForm, WirePath};
use crate::value_wire::WireValue;

/// Numeric opcode tags, fixed by `spec.md` §6: `0:SET, 1:DEL, 2:INS, 3:PATCH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// `SET`.
    Set = 0,
    /// `DEL`.
    Del = 1,
    /// `INS`.
    Ins = 2,
    /// `PATCH`.
    Patch = 3,
}

/// One opcode, ready for JSON-tuple or MessagePack-array serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireOp {
    /// `0:SET, 1:DEL, 2:INS, 3:PATCH`.
    pub op_code: u8,
    /// Target path, literal or path-hashed per the encoder's [`PathForm`].
    pub path: WirePath,
    /// Payload. `None` for `DEL` and for `PATCH` (whose payload lives in
    /// [`WireOp::sub_ops`] instead).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<WireValue>,
    /// `PATCH`'s nested ops, applied relative to `path`. `None` for every
    /// other opcode.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sub_ops: Option<Vec<WireOp>>,
}

/// Converts one [`Op`] to its wire form.
///
/// # Errors
/// Propagates [`CodecError::SchemaMismatch`] from [`encode_path`].
pub fn encode_op(op: &Op, form: PathForm, table: &PathHashTable) -> Result<WireOp, CodecError> {
    match op {
        Op::Set { path, value } => Ok(WireOp {
            op_code: OpCode::Set as u8,
            path: encode_path(path, form, table)?,
            value: Some(WireValue::from(value)),
            sub_ops: None,
        }),
        Op::Del { path } => Ok(WireOp {
            op_code: OpCode::Del as u8,
            path: encode_path(path, form, table)?,
            value: None,
            sub_ops: None,
        }),
        Op::Ins { path, value } => Ok(WireOp {
            op_code: OpCode::Ins as u8,
            path: encode_path(path, form, table)?,
            value: Some(WireValue::from(value)),
            sub_ops: None,
        }),
        Op::Patch { path, sub_ops } => {
            let encoded_sub_ops = sub_ops
                .iter()
                .map(|sub_op| encode_op(sub_op, form, table))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(WireOp {
                op_code: OpCode::Patch as u8,
                path: encode_path(path, form, table)?,
                value: None,
                sub_ops: Some(encoded_sub_ops),
            })
        }
    }
}

/// Converts a full ordered diff to wire ops.
///
/// # Errors
/// Propagates [`CodecError::SchemaMismatch`] from [`encode_op`].
pub fn encode_ops(ops: &[Op], form: PathForm, table: &PathHashTable) -> Result<Vec<WireOp>, CodecError> {
    ops.iter().map(|op| encode_op(op, form, table)).collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use land_state::{FieldPath, PathSegment, SnapshotValue};

    #[test]
    fn set_op_round_trips_through_literal_form() {
        let table = PathHashTable::build(vec!["hp".to_string()]).expect("no collisions");
        let op = Op::Set {
            path: FieldPath(vec![PathSegment::Name("hp".to_string())]),
            value: SnapshotValue::Int(90),
        };
        let wire = encode_op(&op, PathForm::Literal, &table).expect("encode");
        assert_eq!(wire.op_code, OpCode::Set as u8);
        assert_eq!(wire.value, Some(WireValue::Int(90)));
    }

    #[test]
    fn del_op_has_no_value() {
        let table = PathHashTable::build(vec!["hp".to_string()]).expect("no collisions");
        let op = Op::Del {
            path: FieldPath(vec![PathSegment::Name("hp".to_string())]),
        };
        let wire = encode_op(&op, PathForm::Literal, &table).expect("encode");
        assert_eq!(wire.value, None);
    }
}
