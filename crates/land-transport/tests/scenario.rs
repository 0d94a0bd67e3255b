// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use land_codec::OpcodeJsonEncoder;
use land_keeper::{spawn_keeper, ActionEnvelope, ActionOutcome, ClientId, KeeperConfig, LandError, LandId, LandServer, PlayerId, RuleContext, RuleEffects, SessionId};
use land_state::{DirtyTracker, FieldPath, NodeSchema, PathHashTable, PathSegment, SnapshotValue, StateNode, SyncPolicy};
use land_transport::{AuthInfoResolver, AuthenticatedInfo, BoxFuture, ParallelConfig, SessionSink, TransportAdapter, TransportError};

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
        let StateNode::Composite(root) = &mut self.state else { unreachable!() };
        let StateNode::Map(players) = root.get_mut("players").expect("players field") else { unreachable!() };
        let mut fields = BTreeMap::new();
        fields.insert("hp".to_string(), StateNode::Leaf(SnapshotValue::Int(100)));
        players.insert(player.0.clone(), StateNode::Composite(fields));

        let insert_path = FieldPath(vec![PathSegment::Name("players".to_string()), PathSegment::Key(player.0.clone())]);
        let mut snapshot_fields = BTreeMap::new();
        snapshot_fields.insert("hp".to_string(), SnapshotValue::Int(100));
        self.tracker.record_ins(insert_path, SnapshotValue::Object(snapshot_fields));
        Ok(RuleEffects::none())
    }
    fn on_leave(&mut self, player: &PlayerId, _session: &SessionId, _ctx: &RuleContext<'_>) -> RuleEffects {
        if let StateNode::Composite(root) = &mut self.state {
            if let Some(StateNode::Map(players)) = root.get_mut("players") {
                players.remove(&player.0);
            }
        }
        RuleEffects::none()
    }
    fn handle_action(
        &mut self,
        _player: &PlayerId,
        _client: &ClientId,
        _session: &SessionId,
        _action: &ActionEnvelope,
        _ctx: &RuleContext<'_>,
    ) -> Result<(ActionOutcome, RuleEffects), LandError> {
        Err(LandError::InvalidAction)
    }
    fn tick(&mut self, _delta_ticks: u32, _ctx: &RuleContext<'_>) -> Result<RuleEffects, LandError> {
        Ok(RuleEffects::none())
    }
}

struct AllowAllAuth;

impl AuthInfoResolver for AllowAllAuth {
    fn resolve<'a>(&'a self, path: &'a str, _uri: &'a str) -> BoxFuture<'a, Result<Option<AuthenticatedInfo>, TransportError>> {
        Box::pin(async move {
            Ok(Some(AuthenticatedInfo { player_id: PlayerId(path.to_string()), metadata: SnapshotValue::Null }))
        })
    }
}

#[derive(Default)]
struct RecordingSink {
    frames: Mutex<Vec<Vec<u8>>>,
}

impl SessionSink for RecordingSink {
    fn send(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<(), TransportError>> {
        Box::pin(async move {
            self.frames.lock().expect("lock").push(bytes);
            Ok(())
        })
    }
}

fn fast_config() -> KeeperConfig {
    KeeperConfig { tick_period: Duration::from_millis(20), command_timeout: Duration::from_millis(200), ..KeeperConfig::default() }
}

#[tokio::test(flavor = "multi_thread")]
async fn join_sends_exactly_one_first_sync_and_second_join_sees_first_player() {
    let path_table = PathHashTable::build(vec!["players.*.hp".to_string()]).expect("no collisions");
    let keeper = spawn_keeper(
        LandId::new("arena", "t1"),
        Box::new(Arena::new()),
        fast_config(),
        Arc::new(()) as Arc<dyn Any + Send + Sync>,
        None,
    );
    let adapter = TransportAdapter::new(
        keeper.clone(),
        OpcodeJsonEncoder::path_hashed(),
        path_table,
        Arc::new(AllowAllAuth),
        ParallelConfig::default(),
        Duration::from_millis(50),
    );
    keeper.set_transport(adapter.clone()).await.expect("set_transport");

    let session_a = SessionId("sess-a".to_string());
    let sink_a = Arc::new(RecordingSink::default());
    adapter.on_connect(session_a.clone(), ClientId("c-a".to_string()), sink_a.clone()).await;
    adapter.perform_join(&session_a, "alice", "/ws").await.expect("join a");
    assert_eq!(sink_a.frames.lock().expect("lock").len(), 1);

    let session_b = SessionId("sess-b".to_string());
    let sink_b = Arc::new(RecordingSink::default());
    adapter.on_connect(session_b.clone(), ClientId("c-b".to_string()), sink_b.clone()).await;
    adapter.perform_join(&session_b, "bob", "/ws").await.expect("join b");
    assert_eq!(sink_b.frames.lock().expect("lock").len(), 1);

    let frame = sink_b.frames.lock().expect("lock")[0].clone();
    let text = String::from_utf8(frame).expect("utf8");
    assert!(text.contains("\"kind\":\"firstSync\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn join_with_unknown_session_is_rejected() {
    let path_table = PathHashTable::build(vec!["players.*.hp".to_string()]).expect("no collisions");
    let keeper = spawn_keeper(
        LandId::new("arena", "t2"),
        Box::new(Arena::new()),
        fast_config(),
        Arc::new(()) as Arc<dyn Any + Send + Sync>,
        None,
    );
    let adapter = TransportAdapter::new(
        keeper,
        OpcodeJsonEncoder::path_hashed(),
        path_table,
        Arc::new(AllowAllAuth),
        ParallelConfig::default(),
        Duration::from_millis(50),
    );
    let err = adapter
        .perform_join(&SessionId("ghost".to_string()), "alice", "/ws")
        .await
        .expect_err("unknown session rejected");
    assert_eq!(err, TransportError::UnknownSession);
}

#[tokio::test(flavor = "multi_thread")]
async fn disconnect_leaves_player_after_grace_window() {
    let path_table = PathHashTable::build(vec!["players.*.hp".to_string()]).expect("no collisions");
    let keeper = spawn_keeper(
        LandId::new("arena", "t3"),
        Box::new(Arena::new()),
        fast_config(),
        Arc::new(()) as Arc<dyn Any + Send + Sync>,
        None,
    );
    let adapter = TransportAdapter::new(
        keeper.clone(),
        OpcodeJsonEncoder::path_hashed(),
        path_table,
        Arc::new(AllowAllAuth),
        ParallelConfig::default(),
        Duration::from_millis(30),
    );
    let session = SessionId("sess-a".to_string());
    let sink = Arc::new(RecordingSink::default());
    adapter.on_connect(session.clone(), ClientId("c-a".to_string()), sink).await;
    adapter.perform_join(&session, "alice", "/ws").await.expect("join");

    let err = keeper.on_join(PlayerId("alice".to_string()), session.clone()).await.expect_err("already joined");
    assert_eq!(err, LandError::AlreadyJoined);

    adapter.on_disconnect(session.clone());
    tokio::time::sleep(Duration::from_millis(80)).await;

    keeper.on_join(PlayerId("alice".to_string()), session).await.expect("rejoin after grace elapsed leave");
}
