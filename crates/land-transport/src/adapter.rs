// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`TransportAdapter`]: owns the session table, the player-to-session
//! binding, per-player dirty views, and the parallel encoding controller
//! (`spec.md` §4.F). Never mutates land state; only dispatches to the
//! keeper and publishes diffs.
//!
//! Grounded on `echo-session-service/src/main.rs`'s `HubState`/`ConnState`
//! connection table, generalized to this crate's richer session state
//! machine, and on the `tokio::sync::mpsc` per-connection send-channel
//! pattern from `echo-session-ws-gateway`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio::sync::RwLock;

use land_codec::Encoder;
use land_keeper::{ClientId, DirtyPublisher, LandKeeperHandle, PlayerId, ServerEvent, SessionId};
use land_state::{Op, PathHashTable, SnapshotValue};

use crate::auth::{AuthInfoResolver, AuthenticatedInfo};
use crate::batch::{BatchPlan, ParallelConfig};
use crate::dirty_view::DirtyView;
use crate::error::TransportError;
use crate::session::{Session, SessionSink, SessionState};

/// Owns one land's transport-facing session state. Generic over the active
/// [`Encoder`] so `E::SUPPORTS_PARALLEL` resolves at compile time, matching
/// `land-codec`'s own static-dispatch encoder shape (`Encoder` carries an
/// associated const and so cannot be a trait object).
pub struct TransportAdapter<E: Encoder + Send + Sync> {
    keeper: LandKeeperHandle,
    encoder: E,
    path_table: PathHashTable,
    auth: Arc<dyn AuthInfoResolver>,
    parallel: ParallelConfig,
    join_grace: Duration,
    sessions: RwLock<HashMap<SessionId, Session>>,
    players: RwLock<HashMap<PlayerId, SessionId>>,
    dirty: StdMutex<HashMap<PlayerId, DirtyView>>,
}

impl<E: Encoder + Send + Sync + 'static> TransportAdapter<E> {
    /// Builds an adapter over `keeper`, wrapped in `Arc` since it is both a
    /// [`DirtyPublisher`] bound into the keeper and shared by every
    /// connection task.
    #[must_use]
    pub fn new(
        keeper: LandKeeperHandle,
        encoder: E,
        path_table: PathHashTable,
        auth: Arc<dyn AuthInfoResolver>,
        parallel: ParallelConfig,
        join_grace: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            keeper,
            encoder,
            path_table,
            auth,
            parallel,
            join_grace,
            sessions: RwLock::new(HashMap::new()),
            players: RwLock::new(HashMap::new()),
            dirty: StdMutex::new(HashMap::new()),
        })
    }

    /// `on_connect`: registers a freshly connected, unauthenticated session.
    pub async fn on_connect(&self, session: SessionId, client: ClientId, sink: Arc<dyn SessionSink>) {
        self.sessions.write().await.insert(session, Session::new(client, sink));
    }

    /// Authenticates `(path, uri)`, validates with the keeper's `on_join`,
    /// and binds `session` to the resulting player. On success schedules the
    /// player's `firstSync` to this session alone.
    ///
    /// # Errors
    /// Returns [`TransportError::UnknownSession`], [`TransportError::Unauthorized`]
    /// (auth resolver refused), or [`TransportError::JoinRejected`] (the
    /// keeper's own `on_join` rule rejected the player).
    pub async fn perform_join(&self, session: &SessionId, path: &str, uri: &str) -> Result<PlayerId, TransportError> {
        {
            let mut sessions = self.sessions.write().await;
            let entry = sessions.get_mut(session).ok_or(TransportError::UnknownSession)?;
            entry.state = SessionState::Authenticating;
        }

        let auth_info = self.authenticate(path, uri).await?;
        let AuthenticatedInfo { player_id, .. } = auth_info;

        self.keeper
            .on_join(player_id.clone(), session.clone())
            .await
            .map_err(TransportError::JoinRejected)?;

        self.dirty.lock().expect("dirty lock poisoned").insert(player_id.clone(), DirtyView::joined());
        self.players.write().await.insert(player_id.clone(), session.clone());
        {
            let mut sessions = self.sessions.write().await;
            if let Some(entry) = sessions.get_mut(session) {
                entry.state = SessionState::Bound(player_id.clone());
            }
        }

        self.send_first_sync(session).await?;
        Ok(player_id)
    }

    async fn authenticate(&self, path: &str, uri: &str) -> Result<AuthenticatedInfo, TransportError> {
        self.auth
            .resolve(path, uri)
            .await?
            .ok_or(TransportError::Unauthorized)
    }

    /// `on_disconnect`: transitions `session` to `Draining`; after
    /// `join_grace` elapses the bound player is `on_leave`d and the session
    /// row removed, unless a reconnect rebound it first.
    pub fn on_disconnect(self: &Arc<Self>, session: SessionId) {
        let adapter = Arc::clone(self);
        tokio::spawn(async move {
            let player = {
                let mut sessions = adapter.sessions.write().await;
                let Some(entry) = sessions.get_mut(&session) else { return };
                let player = entry.player().cloned();
                entry.state = SessionState::Draining;
                player
            };

            tokio::time::sleep(adapter.join_grace).await;

            let still_draining = {
                let sessions = adapter.sessions.read().await;
                matches!(sessions.get(&session).map(|s| &s.state), Some(SessionState::Draining))
            };
            if !still_draining {
                return;
            }

            if let Some(player) = player {
                let _ = adapter.keeper.on_leave(player.clone(), session.clone()).await;
                adapter.players.write().await.remove(&player);
                adapter.dirty.lock().expect("dirty lock poisoned").remove(&player);
            }
            adapter.sessions.write().await.remove(&session);
        });
    }

    async fn send_first_sync(&self, session: &SessionId) -> Result<(), TransportError> {
        let snapshot = self.keeper.get_snapshot().await.map_err(|_| TransportError::EncodeError)?;
        let bytes = self.encoder.encode_first_sync(&snapshot).map_err(|_| TransportError::EncodeError)?;
        let sink = {
            let sessions = self.sessions.read().await;
            sessions.get(session).map(|entry| Arc::clone(&entry.sink))
        };
        let Some(sink) = sink else { return Err(TransportError::UnknownSession) };
        sink.send(bytes).await?;
        if let Some(player) = self.bound_player(session).await {
            if let Some(view) = self.dirty.lock().expect("dirty lock poisoned").get_mut(&player) {
                view.mark_first_synced();
                view.clear();
            }
        }
        Ok(())
    }

    async fn bound_player(&self, session: &SessionId) -> Option<PlayerId> {
        self.sessions.read().await.get(session).and_then(Session::player).cloned()
    }

    /// `sync_now`: encodes and sends each bound player's non-empty pending
    /// diff (or a fresh `firstSync` if they still need one, or their session
    /// is marked `stale`), clearing it on success, fanned out per the
    /// parallel encoding controller.
    pub async fn sync_now(&self) {
        let recipients: Vec<(PlayerId, SessionId)> = {
            let sessions = self.sessions.read().await;
            let players = self.players.read().await;
            players
                .iter()
                .filter(|(_, session)| matches!(sessions.get(session).map(|s| &s.state), Some(SessionState::Bound(_))))
                .map(|(player, session)| (player.clone(), session.clone()))
                .collect()
        };
        if recipients.is_empty() {
            return;
        }

        match self.parallel.plan_for(recipients.len(), E::SUPPORTS_PARALLEL) {
            BatchPlan::Serial => {
                for (player, session) in recipients {
                    self.flush_one(&player, &session).await;
                }
            }
            BatchPlan::Parallel { batch_size, concurrency } => {
                let batches: Vec<Vec<(PlayerId, SessionId)>> =
                    recipients.chunks(batch_size).map(<[_]>::to_vec).collect();
                stream::iter(batches)
                    .for_each_concurrent(Some(concurrency), |batch| async move {
                        for (player, session) in batch {
                            self.flush_one(&player, &session).await;
                        }
                    })
                    .await;
            }
        }
    }

    async fn flush_one(&self, player: &PlayerId, session: &SessionId) {
        let needs_first_sync = self.needs_first_sync_or_stale(player, session).await;
        if needs_first_sync {
            let _ = self.send_first_sync(session).await;
            return;
        }

        let pending = {
            let dirty = self.dirty.lock().expect("dirty lock poisoned");
            dirty.get(player).map(|view| view.pending.clone()).unwrap_or_default()
        };
        if pending.is_empty() {
            return;
        }

        let snapshot = match self.keeper.get_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(_) => return,
        };
        let Ok(bytes) = self.encoder.encode_diff(&pending, &snapshot, &self.path_table) else {
            tracing::warn!(?player, "encode_diff failed; leaving pending diff for next flush");
            return;
        };

        let sink = {
            let sessions = self.sessions.read().await;
            sessions.get(session).map(|entry| Arc::clone(&entry.sink))
        };
        let Some(sink) = sink else { return };
        if sink.send(bytes).await.is_ok() {
            if let Some(view) = self.dirty.lock().expect("dirty lock poisoned").get_mut(player) {
                view.clear();
            }
        } else if let Some(entry) = self.sessions.write().await.get_mut(session) {
            entry.stale = true;
        }
    }

    async fn needs_first_sync_or_stale(&self, player: &PlayerId, session: &SessionId) -> bool {
        let stale = self.sessions.read().await.get(session).is_some_and(|entry| entry.stale);
        let needs_first_sync = self
            .dirty
            .lock()
            .expect("dirty lock poisoned")
            .get(player)
            .is_some_and(|view| view.needs_first_sync);
        if stale {
            if let Some(entry) = self.sessions.write().await.get_mut(session) {
                entry.stale = false;
            }
            if let Some(view) = self.dirty.lock().expect("dirty lock poisoned").get_mut(player) {
                view.needs_first_sync = true;
            }
            return true;
        }
        needs_first_sync
    }
}

impl<E: Encoder + Send + Sync> DirtyPublisher for TransportAdapter<E> {
    fn notify_ops(&self, ops: &[Op]) {
        let mut dirty = self.dirty.lock().expect("dirty lock poisoned");
        for view in dirty.values_mut() {
            view.merge(ops);
        }
    }

    fn notify_events(&self, _events: &[ServerEvent]) {
        // `serverEvent` is its own wire kind (`spec.md` §6), delivered out of
        // band from `stateUpdate` by the transport binding that owns the
        // concrete session sinks; this crate's adapter only tracks diffs.
    }

    fn flush(&self, _snapshot: &SnapshotValue) {
        // Called from inside the keeper's actor task: must not block or
        // await. `sync_now` does the real encode/send work and is driven by
        // whoever owns this adapter (a periodic task or a direct call after
        // `request_sync_flush`), matching `spec.md` §5's rule that transport
        // fan-out happens only after the keeper has produced the diff.
    }
}
