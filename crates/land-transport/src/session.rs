// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session lifecycle (`spec.md` §4.F):
//! `Unauthenticated -> Authenticating -> Bound(player) -> Draining -> Closed`.

use std::sync::Arc;

use land_keeper::{ClientId, PlayerId};

use crate::auth::BoxFuture;
use crate::error::TransportError;

/// One session's lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, no `join` message received yet.
    Unauthenticated,
    /// A `join` is in flight against the auth resolver and the keeper.
    Authenticating,
    /// Authenticated and joined; receiving state updates for `PlayerId`.
    Bound(PlayerId),
    /// Disconnected; the player will be `on_leave`d once the grace window
    /// elapses, unless a reconnect rebinds the session first.
    Draining,
    /// Terminal. The session table entry is about to be removed.
    Closed,
}

/// Delivers encoded frames to one connection. Implemented by the transport
/// binding (e.g. an `axum` WebSocket's outbound `mpsc::Sender<Message>`,
/// matching `echo-session-ws-gateway`'s per-connection writer-task pattern)
/// — this crate knows nothing about the concrete wire transport.
pub trait SessionSink: Send + Sync {
    /// Enqueues `bytes` as one frame. Resolves once handed to the
    /// transport's own outbound queue, not once delivered.
    ///
    /// # Errors
    /// Returns [`TransportError::SendTimeout`] if the sink's outbound queue
    /// does not drain before the configured deadline.
    fn send(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<(), TransportError>>;
}

/// One entry of the adapter's session table.
pub struct Session {
    /// The per-connection client identity.
    pub client: ClientId,
    /// Current lifecycle state.
    pub state: SessionState,
    /// Where encoded frames for this session are sent.
    pub sink: Arc<dyn SessionSink>,
    /// Set once this session's queue has exceeded `Q_max` and been marked
    /// `stale` (`spec.md` §5 "Backpressure"): the next flush sends a fresh
    /// `firstSync` instead of a diff.
    pub stale: bool,
}

impl Session {
    /// A freshly connected, unauthenticated session.
    #[must_use]
    pub fn new(client: ClientId, sink: Arc<dyn SessionSink>) -> Self {
        Self { client, state: SessionState::Unauthenticated, sink, stale: false }
    }

    /// The bound player, if this session has joined.
    #[must_use]
    pub fn player(&self) -> Option<&PlayerId> {
        match &self.state {
            SessionState::Bound(player) => Some(player),
            _ => None,
        }
    }
}
