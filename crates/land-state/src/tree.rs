// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The state tree: a schema-typed composite of leaves, arrays, and maps,
//! each tagged with a [`SyncPolicy`].
//!
//! The schema (field names, nesting, sync policy) is fixed once at
//! land-type registration (see `spec.md` §3, `StateNode` invariant); only
//! leaf values and map/array cardinalities mutate at runtime. [`NodeSchema`]
//! models the static shape; [`StateNode`] models the live data, always kept
//! in lockstep with its schema by construction.

use std::collections::BTreeMap;

use crate::path::{FieldPath, PathSegment};
use crate::value::SnapshotValue;

/// Replication policy for one field of the state tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Replicated to every member of the land.
    Broadcast,
    /// Never included in any player view; still available to the
    /// reevaluation hash if the land type opts it in explicitly.
    ServerOnly,
}

/// The static shape of one node in a state tree.
#[derive(Debug, Clone)]
pub enum NodeSchema {
    /// A leaf of any [`SnapshotValue`] shape.
    Leaf {
        /// Replication policy for this leaf.
        policy: SyncPolicy,
        /// Value a freshly-instantiated tree starts with.
        default: SnapshotValue,
    },
    /// A fixed set of named fields. Field order is the schema's
    /// declaration order and is preserved in snapshots and templates.
    Composite {
        /// `(field name, field schema)` pairs, in declaration order.
        fields: Vec<(String, NodeSchema)>,
    },
    /// An ordered array of elements sharing one element schema.
    Array {
        /// Replication policy for the array as a whole.
        policy: SyncPolicy,
        /// Schema shared by every element.
        element: Box<NodeSchema>,
    },
    /// A map from string key to element, key set mutable at runtime.
    Map {
        /// Replication policy for the map as a whole.
        policy: SyncPolicy,
        /// Schema shared by every entry's value.
        element: Box<NodeSchema>,
    },
}

impl NodeSchema {
    /// Builds the default live node for this schema (empty arrays/maps,
    /// default-valued leaves, recursively instantiated composites).
    #[must_use]
    pub fn instantiate(&self) -> StateNode {
        match self {
            Self::Leaf { default, .. } => StateNode::Leaf(default.clone()),
            Self::Composite { fields } => StateNode::Composite(
                fields
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.instantiate()))
                    .collect(),
            ),
            Self::Array { .. } => StateNode::Array(Vec::new()),
            Self::Map { .. } => StateNode::Map(BTreeMap::new()),
        }
    }

    /// Enumerates every path template this schema can produce, rooted at
    /// `prefix`. Feeds `PathHashTable::build` (see [`crate::path`]).
    pub fn collect_templates(&self, prefix: &FieldPath, out: &mut Vec<String>) {
        match self {
            Self::Leaf { .. } => out.push(prefix.to_template_string()),
            Self::Composite { fields } => {
                if fields.is_empty() {
                    out.push(prefix.to_template_string());
                }
                for (name, schema) in fields {
                    let child = prefix.child(PathSegment::Name(name.clone()));
                    schema.collect_templates(&child, out);
                }
            }
            Self::Array { element, .. } => {
                let child = prefix.child(PathSegment::Index(0));
                element.collect_templates(&child, out);
            }
            Self::Map { element, .. } => {
                let child = prefix.child(PathSegment::Key(String::new()));
                element.collect_templates(&child, out);
            }
        }
    }

    /// Replication policy carried by this node, if it has one of its own
    /// (composites inherit no policy; it lives on their fields).
    #[must_use]
    pub fn policy(&self) -> Option<SyncPolicy> {
        match self {
            Self::Leaf { policy, .. } | Self::Array { policy, .. } | Self::Map { policy, .. } => {
                Some(*policy)
            }
            Self::Composite { .. } => None,
        }
    }
}

/// The live data of a state tree, shape-matched to a [`NodeSchema`].
#[derive(Debug, Clone, PartialEq)]
pub enum StateNode {
    /// A leaf value.
    Leaf(SnapshotValue),
    /// Fixed named fields, in schema declaration order.
    Composite(BTreeMap<String, StateNode>),
    /// An ordered array of child nodes.
    Array(Vec<StateNode>),
    /// A mutable-keyed map of child nodes.
    Map(BTreeMap<String, StateNode>),
}

/// Walks `node` against `schema`, producing the broadcast-projection
/// [`SnapshotValue`] — every field whose policy is [`SyncPolicy::ServerOnly`]
/// is omitted entirely, recursively.
#[must_use]
pub fn snapshot_broadcast(node: &StateNode, schema: &NodeSchema) -> Option<SnapshotValue> {
    match (node, schema) {
        (StateNode::Leaf(value), NodeSchema::Leaf { policy, .. }) => match policy {
            SyncPolicy::Broadcast => Some(value.clone()),
            SyncPolicy::ServerOnly => None,
        },
        (StateNode::Composite(fields), NodeSchema::Composite { fields: schema_fields }) => {
            let mut out = BTreeMap::new();
            for (name, field_schema) in schema_fields {
                if let Some(child) = fields.get(name) {
                    if let Some(snapshot) = snapshot_broadcast(child, field_schema) {
                        out.insert(name.clone(), snapshot);
                    }
                }
            }
            Some(SnapshotValue::Object(out))
        }
        (StateNode::Array(items), NodeSchema::Array { policy, element }) => match policy {
            SyncPolicy::ServerOnly => None,
            SyncPolicy::Broadcast => Some(SnapshotValue::Array(
                items
                    .iter()
                    .filter_map(|item| snapshot_broadcast(item, element))
                    .collect(),
            )),
        },
        (StateNode::Map(entries), NodeSchema::Map { policy, element }) => match policy {
            SyncPolicy::ServerOnly => None,
            SyncPolicy::Broadcast => {
                let mut out = BTreeMap::new();
                for (key, value) in entries {
                    if let Some(snapshot) = snapshot_broadcast(value, element) {
                        out.insert(key.clone(), snapshot);
                    }
                }
                Some(SnapshotValue::Object(out))
            }
        },
        _ => None,
    }
}
