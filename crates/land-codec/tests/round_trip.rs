// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::BTreeMap;

use land_codec::{Encoder, OpcodeJsonEncoder, WireEnvelope};
use land_state::{FieldPath, Op, PathHashTable, PathSegment, SnapshotValue};

/// Applies a decoded `diff` envelope's ops to `tree`, simulating a client
/// applying an opcode stream (`spec.md` §8 round-trip law).
fn apply_diff(tree: &mut SnapshotValue, envelope: &WireEnvelope) {
    let WireEnvelope::Diff { ops, .. } = envelope else {
        panic!("expected diff envelope");
    };
    for op in ops {
        apply_wire_op(tree, op);
    }
}

fn apply_wire_op(tree: &mut SnapshotValue, op: &land_codec::WireOp) {
    use land_codec::{OpCode, WirePath};
    let WirePath::Literal(path) = &op.path else {
        panic!("test uses literal path form");
    };
    let SnapshotValue::Object(root) = tree else {
        panic!("root must be an object");
    };
    match op.op_code {
        code if code == OpCode::Set as u8 => {
            let value = op.value.as_ref().expect("SET carries a value");
            root.insert(path.clone(), SnapshotValue::from(value));
        }
        code if code == OpCode::Del as u8 => {
            root.remove(path);
        }
        code if code == OpCode::Ins as u8 => {
            let value = op.value.as_ref().expect("INS carries a value");
            root.insert(path.clone(), SnapshotValue::from(value));
        }
        _ => panic!("unexpected opcode in test fixture"),
    }
}

#[test]
fn encode_then_decode_round_trips_pre_diff_to_post_diff_state() {
    let table = PathHashTable::build(vec!["hp".to_string(), "name".to_string()]).expect("no collisions");
    let encoder = OpcodeJsonEncoder::legacy();

    let mut pre_fields = BTreeMap::new();
    pre_fields.insert("hp".to_string(), SnapshotValue::Int(100));
    pre_fields.insert("name".to_string(), SnapshotValue::String("alice".to_string()));
    let mut tree = SnapshotValue::Object(pre_fields);

    let ops = vec![Op::Set {
        path: FieldPath(vec![PathSegment::Name("hp".to_string())]),
        value: SnapshotValue::Int(90),
    }];

    let encoded = encoder.encode_diff(&ops, &tree, &table).expect("encode");
    let decoded: WireEnvelope = serde_json::from_slice(&encoded).expect("decode");
    apply_diff(&mut tree, &decoded);

    let SnapshotValue::Object(post_fields) = &tree else {
        panic!("expected object");
    };
    assert_eq!(post_fields.get("hp"), Some(&SnapshotValue::Int(90)));
    assert_eq!(post_fields.get("name"), Some(&SnapshotValue::String("alice".to_string())));
}
