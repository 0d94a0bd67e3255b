// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use land_keeper::{
    spawn_keeper, ActionEnvelope, ActionOutcome, ClientId, DirtyPublisher, KeeperConfig, KeeperState,
    LandError, LandId, LandServer, PlayerId, ReevaluationEntry, RetentionPolicy, RuleContext, RuleEffects,
    ServerEvent, SessionId,
};
use land_state::{
    DirtyTracker, FieldPath, NodeSchema, Op, PathSegment, SnapshotValue, StateNode, SyncPolicy,
};

fn arena_schema() -> NodeSchema {
    NodeSchema::Composite {
        fields: vec![(
            "players".to_string(),
            NodeSchema::Map {
                policy: SyncPolicy::Broadcast,
                element: Box::new(NodeSchema::Composite {
                    fields: vec![(
                        "hp".to_string(),
                        NodeSchema::Leaf { policy: SyncPolicy::Broadcast, default: SnapshotValue::Int(100) },
                    )],
                }),
            },
        )],
    }
}

struct Arena {
    schema: NodeSchema,
    state: StateNode,
    tracker: DirtyTracker,
}

impl Arena {
    fn new() -> Self {
        let schema = arena_schema();
        let state = schema.instantiate();
        Self { schema, state, tracker: DirtyTracker::new() }
    }

    fn hp_path(player: &PlayerId) -> FieldPath {
        FieldPath(vec![
            PathSegment::Name("players".to_string()),
            PathSegment::Key(player.0.clone()),
            PathSegment::Name("hp".to_string()),
        ])
    }
}

impl LandServer for Arena {
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
        let StateNode::Composite(root) = &mut self.state else { unreachable!("arena root is a composite") };
        let StateNode::Map(players) = root.get_mut("players").expect("players field") else {
            unreachable!("players field is a map")
        };
        let mut fields = BTreeMap::new();
        fields.insert("hp".to_string(), StateNode::Leaf(SnapshotValue::Int(100)));
        players.insert(player.0.clone(), StateNode::Composite(fields));

        let insert_path = FieldPath(vec![PathSegment::Name("players".to_string()), PathSegment::Key(player.0.clone())]);
        let mut snapshot_fields = BTreeMap::new();
        snapshot_fields.insert("hp".to_string(), SnapshotValue::Int(100));
        self.tracker.record_ins(insert_path, SnapshotValue::Object(snapshot_fields));

        let mut effects = RuleEffects::none();
        effects.emit(ServerEvent { type_identifier: "joined".to_string(), payload: SnapshotValue::Bool(true) });
        Ok(effects)
    }

    fn on_leave(&mut self, player: &PlayerId, _session: &SessionId, _ctx: &RuleContext<'_>) -> RuleEffects {
        if let StateNode::Composite(root) = &mut self.state {
            if let Some(StateNode::Map(players)) = root.get_mut("players") {
                players.remove(&player.0);
            }
        }
        self.tracker.record_del(FieldPath(vec![
            PathSegment::Name("players".to_string()),
            PathSegment::Key(player.0.clone()),
        ]));
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
        if action.type_identifier != "hit" {
            return Err(LandError::InvalidAction);
        }
        let SnapshotValue::Int(damage) = action.payload.clone() else { return Err(LandError::InvalidAction) };

        let StateNode::Composite(root) = &mut self.state else { unreachable!() };
        let StateNode::Map(players) = root.get_mut("players").expect("players field") else { unreachable!() };
        let Some(StateNode::Composite(fields)) = players.get_mut(&player.0) else {
            return Err(LandError::Unauthorized);
        };
        let Some(StateNode::Leaf(SnapshotValue::Int(hp))) = fields.get("hp").cloned() else {
            return Err(LandError::InvalidAction);
        };
        let new_hp = hp - damage;
        fields.insert("hp".to_string(), StateNode::Leaf(SnapshotValue::Int(new_hp)));
        self.tracker.record_set(Self::hp_path(player), SnapshotValue::Int(new_hp));

        let mut effects = RuleEffects::none();
        if new_hp <= 0 {
            effects.emit(ServerEvent { type_identifier: "eliminated".to_string(), payload: SnapshotValue::String(player.0.clone()) });
        }
        Ok((ActionOutcome { result: SnapshotValue::Int(new_hp) }, effects))
    }

    fn tick(&mut self, _delta_ticks: u32, _ctx: &RuleContext<'_>) -> Result<RuleEffects, LandError> {
        Ok(RuleEffects::none())
    }
}

#[derive(Default)]
struct RecordingPublisher {
    ops: Mutex<Vec<Op>>,
    flushes: Mutex<u32>,
}

impl DirtyPublisher for RecordingPublisher {
    fn notify_ops(&self, ops: &[Op]) {
        self.ops.lock().expect("lock").extend_from_slice(ops);
    }
    fn notify_events(&self, _events: &[ServerEvent]) {}
    fn flush(&self, _snapshot: &SnapshotValue) {
        *self.flushes.lock().expect("lock") += 1;
    }
}

fn fast_config() -> KeeperConfig {
    KeeperConfig {
        tick_period: Duration::from_millis(20),
        command_timeout: Duration::from_millis(200),
        ..KeeperConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn join_action_tick_round_trip_records_reevaluation() {
    let handle = spawn_keeper(
        LandId::new("arena", "a1"),
        Box::new(Arena::new()),
        fast_config(),
        Arc::new(()) as Arc<dyn Any + Send + Sync>,
        Some(RetentionPolicy::KeepAll),
    );

    let publisher = Arc::new(RecordingPublisher::default());
    handle.set_transport(publisher.clone()).await.expect("set_transport");

    let player = PlayerId("p1".to_string());
    let session = SessionId("s1".to_string());
    let client = ClientId("c1".to_string());

    handle.on_join(player.clone(), session.clone()).await.expect("join");
    assert_eq!(publisher.ops.lock().expect("lock").len(), 1);

    let outcome = handle
        .handle_action(
            player.clone(),
            client,
            session.clone(),
            ActionEnvelope { request_id: 1, type_identifier: "hit".to_string(), payload: SnapshotValue::Int(30) },
        )
        .await
        .expect("hit action");
    assert_eq!(outcome.result, SnapshotValue::Int(70));
    assert_eq!(publisher.ops.lock().expect("lock").len(), 2);

    handle.step_tick_once().await.expect("tick");

    let record: Vec<ReevaluationEntry<ActionEnvelope, ServerEvent>> =
        handle.get_reevaluation_record().await.expect("recorder enabled");
    assert_eq!(record.len(), 1);
    assert_eq!(record[0].tick, 0);
    assert_eq!(record[0].applied_envelopes.len(), 1);

    handle.request_sync_flush().await.expect("flush");
    assert_eq!(*publisher.flushes.lock().expect("lock"), 1);

    handle.on_leave(player, session).await.expect("leave never fails");
}

#[tokio::test(flavor = "multi_thread")]
async fn second_join_for_same_player_is_rejected() {
    let handle = spawn_keeper(
        LandId::new("arena", "a2"),
        Box::new(Arena::new()),
        fast_config(),
        Arc::new(()) as Arc<dyn Any + Send + Sync>,
        None,
    );
    let player = PlayerId("dup".to_string());
    let session = SessionId("s1".to_string());
    handle.on_join(player.clone(), session.clone()).await.expect("first join");
    let err = handle.on_join(player, session).await.expect_err("second join rejected");
    assert_eq!(err, LandError::AlreadyJoined);
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_action_before_join_is_rejected() {
    let handle = spawn_keeper(
        LandId::new("arena", "a3"),
        Box::new(Arena::new()),
        fast_config(),
        Arc::new(()) as Arc<dyn Any + Send + Sync>,
        None,
    );
    let err = handle
        .handle_action(
            PlayerId("ghost".to_string()),
            ClientId("c1".to_string()),
            SessionId("s1".to_string()),
            ActionEnvelope { request_id: 1, type_identifier: "hit".to_string(), payload: SnapshotValue::Int(1) },
        )
        .await
        .expect_err("rejected");
    assert_eq!(err, LandError::Unauthorized);
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_action_rolls_back_without_touching_dirty_tracker() {
    let handle = spawn_keeper(
        LandId::new("arena", "a4"),
        Box::new(Arena::new()),
        fast_config(),
        Arc::new(()) as Arc<dyn Any + Send + Sync>,
        None,
    );
    let publisher = Arc::new(RecordingPublisher::default());
    handle.set_transport(publisher.clone()).await.expect("set_transport");

    let player = PlayerId("p1".to_string());
    let session = SessionId("s1".to_string());
    handle.on_join(player.clone(), session.clone()).await.expect("join");
    assert_eq!(publisher.ops.lock().expect("lock").len(), 1);

    let err = handle
        .handle_action(
            player,
            ClientId("c1".to_string()),
            session,
            ActionEnvelope { request_id: 2, type_identifier: "unknown".to_string(), payload: SnapshotValue::Null },
        )
        .await
        .expect_err("unknown action rejected");
    assert_eq!(err, LandError::InvalidAction);
    assert_eq!(publisher.ops.lock().expect("lock").len(), 1, "rejected action must not publish new ops");
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_drains_then_rejects_new_commands() {
    let handle = spawn_keeper(
        LandId::new("arena", "a5"),
        Box::new(Arena::new()),
        fast_config(),
        Arc::new(()) as Arc<dyn Any + Send + Sync>,
        None,
    );
    handle.shutdown().await.expect("shutdown accepted");
    assert_eq!(handle.state(), KeeperState::Draining);

    let err = handle
        .on_join(PlayerId("late".to_string()), SessionId("s1".to_string()))
        .await
        .expect_err("rejected once draining");
    assert_eq!(err, LandError::ShuttingDown);
}
