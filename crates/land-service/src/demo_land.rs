// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `DemoLobby`: the land type this binary boots when it has no other
//! [`LandServer`] to run. Joining adds a player with a ping counter; the
//! `ping` action increments it and echoes the new value back. Exists so
//! `land-service` is runnable standalone — a real deployment registers its
//! own land type in place of this one.

use std::collections::BTreeMap;

use land_keeper::{
    ActionEnvelope, ActionOutcome, ClientId, LandError, LandServer, PlayerId, RuleContext, RuleEffects, SessionId,
};
use land_state::{DirtyTracker, FieldPath, NodeSchema, PathSegment, SnapshotValue, StateNode, SyncPolicy};

/// The one land type `land-service` can boot without a caller supplying
/// their own [`LandServer`].
pub struct DemoLobby {
    schema: NodeSchema,
    state: StateNode,
    tracker: DirtyTracker,
}

impl DemoLobby {
    /// Builds a fresh, empty lobby.
    #[must_use]
    pub fn new() -> Self {
        let schema = Self::schema();
        let state = schema.instantiate();
        Self { schema, state, tracker: DirtyTracker::new() }
    }

    fn schema() -> NodeSchema {
        NodeSchema::Composite {
            fields: vec![(
                "players".to_string(),
                NodeSchema::Map {
                    policy: SyncPolicy::Broadcast,
                    element: Box::new(NodeSchema::Composite {
                        fields: vec![(
                            "pings".to_string(),
                            NodeSchema::Leaf { policy: SyncPolicy::Broadcast, default: SnapshotValue::Int(0) },
                        )],
                    }),
                },
            )],
        }
    }

    /// Broadcast field path templates this land type's `PathHashTable` must
    /// cover, for the opcode encoders.
    #[must_use]
    pub fn synced_paths() -> Vec<String> {
        vec!["players.*.pings".to_string()]
    }
}

impl Default for DemoLobby {
    fn default() -> Self {
        Self::new()
    }
}

impl LandServer for DemoLobby {
    fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    fn state(&self) -> &StateNode {
        &self.state
    }

    fn state_mut(&mut self) -> &mut StateNode {
        &mut self.state
    }

    fn dirty_tracker_mut(&mut self) -> &mut DirtyTracker {
        &mut self.tracker
    }

    fn on_join(&mut self, player: &PlayerId, _session: &SessionId, _ctx: &RuleContext<'_>) -> Result<RuleEffects, LandError> {
        let StateNode::Composite(root) = &mut self.state else { unreachable!() };
        let StateNode::Map(players) = root.get_mut("players").expect("players field") else { unreachable!() };
        if players.contains_key(&player.0) {
            return Err(LandError::AlreadyJoined);
        }
        let mut fields = BTreeMap::new();
        fields.insert("pings".to_string(), StateNode::Leaf(SnapshotValue::Int(0)));
        players.insert(player.0.clone(), StateNode::Composite(fields));

        let path = FieldPath(vec![PathSegment::Name("players".to_string()), PathSegment::Key(player.0.clone())]);
        let mut snapshot = BTreeMap::new();
        snapshot.insert("pings".to_string(), SnapshotValue::Int(0));
        self.tracker.record_ins(path, SnapshotValue::Object(snapshot));
        Ok(RuleEffects::none())
    }

    fn on_leave(&mut self, player: &PlayerId, _session: &SessionId, _ctx: &RuleContext<'_>) -> RuleEffects {
        if let StateNode::Composite(root) = &mut self.state {
            if let Some(StateNode::Map(players)) = root.get_mut("players") {
                players.remove(&player.0);
            }
        }
        let path = FieldPath(vec![PathSegment::Name("players".to_string()), PathSegment::Key(player.0.clone())]);
        self.tracker.record_del(path);
        RuleEffects::none()
    }

    fn handle_action(
        &mut self,
        player: &PlayerId,
        _client: &ClientId,
        _session: &SessionId,
        action: &ActionEnvelope,
        _ctx: &RuleContext<'_>,
    ) -> Result<(ActionOutcome, RuleEffects), LandError> {
        if action.type_identifier != "ping" {
            return Err(LandError::InvalidAction);
        }
        let StateNode::Composite(root) = &mut self.state else { unreachable!() };
        let StateNode::Map(players) = root.get_mut("players").expect("players field") else { unreachable!() };
        let StateNode::Composite(fields) = players.get_mut(&player.0).ok_or(LandError::Unauthorized)? else {
            return Err(LandError::Unauthorized);
        };
        let StateNode::Leaf(SnapshotValue::Int(count)) = fields.get_mut("pings").expect("pings field") else {
            unreachable!()
        };
        *count += 1;
        let new_count = *count;

        let path = FieldPath(vec![
            PathSegment::Name("players".to_string()),
            PathSegment::Key(player.0.clone()),
            PathSegment::Name("pings".to_string()),
        ]);
        self.tracker.record_set(path, SnapshotValue::Int(new_count));

        let mut effects = RuleEffects::none();
        effects.request_sync();
        Ok((ActionOutcome { result: SnapshotValue::Int(new_count) }, effects))
    }

    fn tick(&mut self, _delta_ticks: u32, _ctx: &RuleContext<'_>) -> Result<RuleEffects, LandError> {
        Ok(RuleEffects::none())
    }
}
