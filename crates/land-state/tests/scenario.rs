// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::BTreeMap;

use land_state::{
    snapshot_broadcast, FieldPath, NodeSchema, Op, PathHashTable, PathSegment, SnapshotValue,
    StateNode, SyncPolicy,
};

fn land_schema() -> NodeSchema {
    NodeSchema::Composite {
        fields: vec![(
            "players".to_string(),
            NodeSchema::Map {
                policy: SyncPolicy::Broadcast,
                element: Box::new(NodeSchema::Composite {
                    fields: vec![(
                        "hp".to_string(),
                        NodeSchema::Leaf {
                            policy: SyncPolicy::Broadcast,
                            default: SnapshotValue::Int(0),
                        },
                    )],
                }),
            },
        )],
    }
}

#[test]
fn opcode_diff_order_add_player_then_update_hp() {
    let schema = land_schema();
    let mut tree = schema.instantiate();
    let mut tracker = land_state::DirtyTracker::new();

    let insert_path = FieldPath(vec![
        PathSegment::Name("players".to_string()),
        PathSegment::Key("a".to_string()),
    ]);
    let mut player_fields = BTreeMap::new();
    player_fields.insert("hp".to_string(), SnapshotValue::Int(100));
    let player_value = SnapshotValue::Object(player_fields.clone());

    if let StateNode::Composite(root_fields) = &mut tree {
        if let Some(StateNode::Map(players)) = root_fields.get_mut("players") {
            let mut player_node = BTreeMap::new();
            player_node.insert("hp".to_string(), StateNode::Leaf(SnapshotValue::Int(100)));
            players.insert("a".to_string(), StateNode::Composite(player_node));
        }
    }
    tracker.record_ins(insert_path, player_value);

    let hp_path = FieldPath(vec![
        PathSegment::Name("players".to_string()),
        PathSegment::Key("a".to_string()),
        PathSegment::Name("hp".to_string()),
    ]);
    if let StateNode::Composite(root_fields) = &mut tree {
        if let Some(StateNode::Map(players)) = root_fields.get_mut("players") {
            if let Some(StateNode::Composite(player_fields)) = players.get_mut("a") {
                player_fields.insert("hp".to_string(), StateNode::Leaf(SnapshotValue::Int(90)));
            }
        }
    }
    tracker.record_set(hp_path, SnapshotValue::Int(90));

    let ops = tracker.ops();
    assert_eq!(ops.len(), 2);
    assert!(matches!(ops[0], Op::Ins { .. }));
    assert!(matches!(ops[1], Op::Set { .. }));

    let snapshot = snapshot_broadcast(&tree, &schema).expect("broadcast snapshot");
    let players = snapshot
        .as_object()
        .and_then(|root| root.get("players"))
        .and_then(SnapshotValue::as_object)
        .expect("players object");
    let hp = players
        .get("a")
        .and_then(SnapshotValue::as_object)
        .and_then(|player| player.get("hp"));
    assert_eq!(hp, Some(&SnapshotValue::Int(90)));
}

#[test]
fn path_hash_table_covers_every_schema_template() {
    let schema = land_schema();
    let mut templates = Vec::new();
    schema.collect_templates(&FieldPath::root(), &mut templates);
    let table = PathHashTable::build(templates.clone()).expect("no collisions");
    for template in &templates {
        assert!(table.template_of(land_state::fnv1a32(template.as_bytes())).is_some());
    }
}
