// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`TransportError`]: failures at the session/encoding boundary, distinct
//! from [`land_keeper::LandError`] (`spec.md` §7: "one `thiserror` enum per
//! crate boundary").

use land_keeper::LandError;
use thiserror::Error;

/// Errors a [`crate::adapter::TransportAdapter`] operation can return.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The auth resolver refused the connection, or the session is not
    /// `Bound` to a player.
    #[error("unauthorized")]
    Unauthorized,
    /// The keeper itself rejected `on_join`.
    #[error("join rejected: {0}")]
    JoinRejected(LandError),
    /// The auth resolver itself failed (not a refusal).
    #[error("auth resolver failed: {0}")]
    AuthFailed(String),
    /// A sync-flush codec call failed twice in a row for one session
    /// (`spec.md` §7 `encode_error`).
    #[error("encode error")]
    EncodeError,
    /// The session's outbound sink did not drain in time
    /// (`spec.md` §7 `send_timeout`).
    #[error("send timeout")]
    SendTimeout,
    /// No session exists with the given id.
    #[error("unknown session")]
    UnknownSession,
    /// The session exists but is `Draining` or `Closed`.
    #[error("session closed")]
    SessionClosed,
}
