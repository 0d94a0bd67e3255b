// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`LandKeeperHandle`]: the public, cloneable handle to one land's
//! single-writer actor, and [`spawn_keeper`], which starts it.
//!
//! The actor itself ([`KeeperActor::run`]) is the only code that ever
//! touches the land's `StateNode` or `DirtyTracker` — every other task talks
//! to it exclusively through `Command`s sent over an `mpsc` channel
//! (`spec.md` §4.E). There is no `Mutex<State>` anywhere in this module:
//! exclusivity comes from the actor being the sole reader of its channel.

use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant as StdInstant};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant as TokioInstant;

use land_reeval::{BoundedRingRecorder, ReevalError, ReevaluationEntry, ReevaluationRunnerService, RetentionPolicy};
use land_state::SnapshotValue;

use crate::command::Command;
use crate::config::KeeperConfig;
use crate::error::LandError;
use crate::ids::{ClientId, LandId, PlayerId, SessionId, Tick};
use crate::publish::{DirtyPublisher, NullPublisher};
use crate::rules::{ActionEnvelope, ActionOutcome, LandServer, RuleContext, RuleEffects, ServerEvent};
use crate::state_machine::KeeperState;

/// Command channel depth. Bounded, not `Q_max` itself (that governs a
/// session's *outbound* queue in `land-transport`) — this just keeps a
/// runaway caller from growing the keeper's inbox unbounded.
const COMMAND_CHANNEL_DEPTH: usize = 256;

/// Handle to a running keeper. Cheap to clone; every clone shares the same
/// underlying actor task.
#[derive(Clone)]
pub struct LandKeeperHandle {
    id: Arc<LandId>,
    command_tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<KeeperState>,
    command_timeout: Duration,
}

impl LandKeeperHandle {
    /// This handle's land id.
    #[must_use]
    pub fn id(&self) -> &LandId {
        &self.id
    }

    /// The keeper's current lifecycle state.
    #[must_use]
    pub fn state(&self) -> KeeperState {
        *self.state_rx.borrow()
    }

    async fn send_command<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, LandError> {
        if !self.state_rx.borrow().accepts_commands() {
            return Err(LandError::ShuttingDown);
        }
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.command_tx.send(make(reply_tx)).await.is_err() {
            return Err(LandError::ShuttingDown);
        }
        match tokio::time::timeout(self.command_timeout, reply_rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(LandError::ShuttingDown),
            Err(_elapsed) => Err(LandError::Timeout),
        }
    }

    /// `handle_action` (`spec.md` §4.E).
    ///
    /// # Errors
    /// See `spec.md` §4.E's `handle_action` error set.
    pub async fn handle_action(
        &self,
        player: PlayerId,
        client: ClientId,
        session: SessionId,
        action: ActionEnvelope,
    ) -> Result<ActionOutcome, LandError> {
        self.send_command(|reply| Command::HandleAction { player, client, session, action, reply }).await?
    }

    /// `on_join`.
    ///
    /// # Errors
    /// See `spec.md` §4.E's `on_join` error set.
    pub async fn on_join(&self, player: PlayerId, session: SessionId) -> Result<(), LandError> {
        self.send_command(|reply| Command::OnJoin { player, session, reply }).await?
    }

    /// `on_leave`. Idempotent.
    ///
    /// # Errors
    /// Returns [`LandError::ShuttingDown`] if the keeper has already
    /// terminated.
    pub async fn on_leave(&self, player: PlayerId, session: SessionId) -> Result<(), LandError> {
        self.send_command(|reply| Command::OnLeave { player, session, reply }).await
    }

    /// `step_tick_once`: advances one tick synchronously, outside the
    /// regular timer schedule. Useful for deterministic tests and replay
    /// tooling driving a keeper by hand.
    ///
    /// # Errors
    /// Returns [`LandError::ShuttingDown`] or [`LandError::Timeout`].
    pub async fn step_tick_once(&self) -> Result<(), LandError> {
        self.send_command(|reply| Command::StepTickOnce { reply }).await
    }

    /// `request_sync_flush`.
    ///
    /// # Errors
    /// Returns [`LandError::ShuttingDown`] or [`LandError::Timeout`].
    pub async fn request_sync_flush(&self) -> Result<(), LandError> {
        self.send_command(|reply| Command::RequestSyncFlush { reply }).await
    }

    /// The current broadcast-projection snapshot, for a transport's initial
    /// `firstSync` to a newly bound player.
    ///
    /// # Errors
    /// Returns [`LandError::ShuttingDown`] or [`LandError::Timeout`].
    pub async fn get_snapshot(&self) -> Result<SnapshotValue, LandError> {
        self.send_command(|reply| Command::GetSnapshot { reply }).await
    }

    /// `set_transport`: binds the [`DirtyPublisher`] the keeper notifies of
    /// every command's effects.
    ///
    /// # Errors
    /// Returns [`LandError::ShuttingDown`] or [`LandError::Timeout`].
    pub async fn set_transport(&self, publisher: Arc<dyn DirtyPublisher>) -> Result<(), LandError> {
        self.send_command(|reply| Command::SetTransport { publisher, reply }).await
    }

    /// `get_reevaluation_record`.
    ///
    /// # Errors
    /// Returns [`LandError::RecorderDisabled`] if this keeper was spawned
    /// without a retention policy.
    pub async fn get_reevaluation_record(
        &self,
    ) -> Result<Vec<ReevaluationEntry<ActionEnvelope, ServerEvent>>, LandError> {
        self.send_command(|reply| Command::GetReevaluationRecord { reply }).await?
    }

    /// Begins graceful shutdown: transitions to `Draining`, finishes
    /// in-flight commands, then `Terminated` once every handle is dropped.
    ///
    /// # Errors
    /// Returns [`LandError::ShuttingDown`] if already draining/terminated.
    pub async fn shutdown(&self) -> Result<(), LandError> {
        self.send_command(|reply| Command::Shutdown { reply }).await
    }
}

/// Spawns a keeper actor for `id` running `server`'s rules, and returns a
/// handle to it.
///
/// `services` is the immutable bag rule bodies read via
/// [`RuleContext::services`] (`spec.md` §9 "Global state"). Pass
/// `Some(policy)` for `recorder_policy` to enable the reevaluation recorder.
#[must_use]
pub fn spawn_keeper(
    id: LandId,
    server: Box<dyn LandServer>,
    config: KeeperConfig,
    services: Arc<dyn Any + Send + Sync>,
    recorder_policy: Option<RetentionPolicy>,
) -> LandKeeperHandle {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_DEPTH);
    let (state_tx, state_rx) = watch::channel(KeeperState::Created);
    let command_timeout = config.command_timeout;
    let id_arc = Arc::new(id.clone());

    let actor = KeeperActor {
        id,
        server,
        config,
        services,
        publisher: Arc::new(NullPublisher),
        recorder: recorder_policy.map(BoundedRingRecorder::new),
        recorder_degraded: 0,
        tick: 0,
        players: BTreeSet::new(),
        rate_windows: HashMap::new(),
        pending_envelopes: Vec::new(),
        pending_events: Vec::new(),
        state_tx,
    };
    tokio::spawn(actor.run(command_rx));

    LandKeeperHandle { id: id_arc, command_tx, state_rx, command_timeout }
}

struct KeeperActor {
    id: LandId,
    server: Box<dyn LandServer>,
    config: KeeperConfig,
    services: Arc<dyn Any + Send + Sync>,
    publisher: Arc<dyn DirtyPublisher>,
    recorder: Option<BoundedRingRecorder<ActionEnvelope, ServerEvent>>,
    recorder_degraded: u64,
    tick: Tick,
    players: BTreeSet<PlayerId>,
    rate_windows: HashMap<SessionId, (StdInstant, u32)>,
    pending_envelopes: Vec<ActionEnvelope>,
    pending_events: Vec<ServerEvent>,
    state_tx: watch::Sender<KeeperState>,
}

impl KeeperActor {
    async fn run(mut self, mut command_rx: mpsc::Receiver<Command>) {
        let _ = self.state_tx.send(KeeperState::Running);
        let mut next_tick_deadline = TokioInstant::now() + self.config.tick_period;
        let mut ticking = true;

        loop {
            tokio::select! {
                biased;
                maybe_command = command_rx.recv() => {
                    match maybe_command {
                        Some(command) => {
                            if matches!(command, Command::Shutdown { .. }) {
                                ticking = false;
                            }
                            self.handle_command(command);
                        }
                        None => break,
                    }
                }
                () = tokio::time::sleep_until(next_tick_deadline), if ticking => {
                    let now = TokioInstant::now();
                    let overdue = now.saturating_duration_since(next_tick_deadline);
                    let period_nanos = self.config.tick_period.as_nanos().max(1);
                    let periods_missed = 1 + u32::try_from(overdue.as_nanos() / period_nanos).unwrap_or(u32::MAX);
                    let delta = periods_missed.min(u32::try_from(self.config.n_max_pending_ticks).unwrap_or(u32::MAX)).max(1);
                    next_tick_deadline += self.config.tick_period * periods_missed;
                    self.run_tick(delta);
                }
            }
        }

        let _ = self.state_tx.send(KeeperState::Terminated);
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::HandleAction { player, client, session, action, reply } => {
                let outcome = self.dispatch_action(&player, &client, &session, action);
                let _ = reply.send(outcome);
            }
            Command::OnJoin { player, session, reply } => {
                let outcome = self.dispatch_join(&player, &session);
                let _ = reply.send(outcome);
            }
            Command::OnLeave { player, session, reply } => {
                self.dispatch_leave(&player, &session);
                let _ = reply.send(());
            }
            Command::StepTickOnce { reply } => {
                self.run_tick(1);
                let _ = reply.send(());
            }
            Command::RequestSyncFlush { reply } => {
                self.do_flush();
                let _ = reply.send(());
            }
            Command::GetSnapshot { reply } => {
                let snapshot = land_state::snapshot_broadcast(self.server.state(), self.server.schema())
                    .unwrap_or_else(|| SnapshotValue::Object(std::collections::BTreeMap::new()));
                let _ = reply.send(snapshot);
            }
            Command::SetTransport { publisher, reply } => {
                self.publisher = publisher;
                let _ = reply.send(());
            }
            Command::GetReevaluationRecord { reply } => {
                let result = self.recorder.as_ref().map_or(Err(LandError::RecorderDisabled), |recorder| {
                    Ok(recorder.cumulative_record().to_vec())
                });
                let _ = reply.send(result);
            }
            Command::Shutdown { reply } => {
                let _ = self.state_tx.send(KeeperState::Draining);
                let _ = reply.send(());
            }
        }
    }

    fn dispatch_join(&mut self, player: &PlayerId, session: &SessionId) -> Result<(), LandError> {
        if self.players.contains(player) {
            return Err(LandError::AlreadyJoined);
        }
        if self.players.len() >= self.config.max_players {
            return Err(LandError::CapacityExceeded);
        }
        let saved_ops_len = self.server.dirty_tracker_mut().ops().len();
        let result = self.run_mutator(|server, ctx| server.on_join(player, session, ctx).map(|effects| ((), effects)));
        match result {
            Ok(((), effects)) => {
                self.players.insert(player.clone());
                self.notify_new_ops(saved_ops_len);
                self.after_effects(&effects);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn dispatch_leave(&mut self, player: &PlayerId, session: &SessionId) {
        if !self.players.remove(player) {
            return;
        }
        let saved_ops_len = self.server.dirty_tracker_mut().ops().len();
        let ctx = RuleContext { tick: self.tick, services: self.services.as_ref() };
        let effects = self.server.on_leave(player, session, &ctx);
        self.notify_new_ops(saved_ops_len);
        self.after_effects(&effects);
    }

    fn dispatch_action(
        &mut self,
        player: &PlayerId,
        client: &ClientId,
        session: &SessionId,
        action: ActionEnvelope,
    ) -> Result<ActionOutcome, LandError> {
        if !self.players.contains(player) {
            return Err(LandError::Unauthorized);
        }
        if self.rate_limited(session) {
            return Err(LandError::RateLimited);
        }
        let saved_ops_len = self.server.dirty_tracker_mut().ops().len();
        let result = self.run_mutator(|server, ctx| server.handle_action(player, client, session, &action, ctx));
        match result {
            Ok((outcome, effects)) => {
                self.notify_new_ops(saved_ops_len);
                if self.recorder.is_some() {
                    self.pending_envelopes.push(action);
                }
                self.after_effects(&effects);
                Ok(outcome)
            }
            Err(err) => Err(err),
        }
    }

    fn rate_limited(&mut self, session: &SessionId) -> bool {
        let now = StdInstant::now();
        let window = self.config.rate_limit_window;
        let limit = self.config.rate_limit_actions;
        let entry = self.rate_windows.entry(session.clone()).or_insert((now, 0));
        if now.duration_since(entry.0) >= window {
            *entry = (now, 0);
        }
        entry.1 += 1;
        entry.1 > limit
    }

    fn run_tick(&mut self, delta: u32) {
        let saved_ops_len = self.server.dirty_tracker_mut().ops().len();
        let result = self.run_mutator(|server, ctx| server.tick(delta, ctx).map(|effects| ((), effects)));
        self.tick += i64::from(delta);
        match result {
            Ok(((), effects)) => {
                self.notify_new_ops(saved_ops_len);
                let tick_events = effects.events.clone();
                self.after_effects(&effects);
                self.record_tick(tick_events);
            }
            Err(LandError::InternalFault) => {
                // run_mutator already rolled back state and logged the fault.
                self.record_tick(Vec::new());
            }
            Err(err) => {
                tracing::warn!(land = %self.id, error = %err, "tick rule rejected its own input");
                self.record_tick(Vec::new());
            }
        }
    }

    fn record_tick(&mut self, tick_events: Vec<ServerEvent>) {
        let Some(recorder) = self.recorder.as_mut() else { return };
        let mut events = std::mem::take(&mut self.pending_events);
        events.extend(tick_events);
        let envelopes = std::mem::take(&mut self.pending_envelopes);
        let snapshot = land_state::snapshot_broadcast(self.server.state(), self.server.schema())
            .unwrap_or_else(|| SnapshotValue::Object(std::collections::BTreeMap::new()));
        let entry = ReevaluationEntry {
            tick: recorder.next_tick(),
            applied_envelopes: envelopes,
            state_hash: land_reeval::canonical_hash(&snapshot),
            emitted_events: events,
        };
        if let Err(ReevalError::TickGap { expected, got }) = recorder.record(entry) {
            self.recorder_degraded += 1;
            tracing::error!(
                land = %self.id,
                expected,
                got,
                degraded_count = self.recorder_degraded,
                "reevaluation record gap; marking tick corrupted (recorder_degraded)"
            );
        }
    }

    fn notify_new_ops(&mut self, saved_ops_len: usize) {
        let ops = self.server.dirty_tracker_mut().ops();
        if ops.len() > saved_ops_len {
            self.publisher.notify_ops(&ops[saved_ops_len..]);
        }
    }

    fn after_effects(&mut self, effects: &RuleEffects) {
        if !effects.events.is_empty() {
            self.publisher.notify_events(&effects.events);
            if self.recorder.is_some() {
                self.pending_events.extend(effects.events.iter().cloned());
            }
        }
        if effects.request_sync {
            self.do_flush();
        }
    }

    fn do_flush(&self) {
        let snapshot = land_state::snapshot_broadcast(self.server.state(), self.server.schema())
            .unwrap_or_else(|| SnapshotValue::Object(std::collections::BTreeMap::new()));
        self.publisher.flush(&snapshot);
    }

    /// Runs `f` against the live server with copy-on-write rollback: on
    /// `Err` or on panic, the state tree and dirty tracker are restored to
    /// their pre-call snapshot (`spec.md` §4.E "Failure handling"). A panic
    /// additionally transitions the keeper to `Draining` and is reported as
    /// [`LandError::InternalFault`] (`spec.md` §7 propagation policy) —
    /// other keepers are unaffected since each runs on its own task.
    fn run_mutator<T>(
        &mut self,
        f: impl FnOnce(&mut dyn LandServer, &RuleContext<'_>) -> Result<(T, RuleEffects), LandError>,
    ) -> Result<(T, RuleEffects), LandError> {
        let saved_state = self.server.state().clone();
        let saved_tracker = self.server.dirty_tracker_mut().clone();
        let ctx = RuleContext { tick: self.tick, services: self.services.as_ref() };
        let server = self.server.as_mut();

        match catch_unwind(AssertUnwindSafe(|| f(server, &ctx))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                *self.server.state_mut() = saved_state;
                *self.server.dirty_tracker_mut() = saved_tracker;
                Err(err)
            }
            Err(_panic_payload) => {
                *self.server.state_mut() = saved_state;
                *self.server.dirty_tracker_mut() = saved_tracker;
                let _ = self.state_tx.send(KeeperState::Draining);
                tracing::error!(land = %self.id, "rule body panicked; keeper transitioning to Draining");
                Err(LandError::InternalFault)
            }
        }
    }
}
