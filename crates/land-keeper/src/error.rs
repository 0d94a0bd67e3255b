// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`LandError`]: every error kind a keeper surfaces to callers (`spec.md`
//! §7). Never leaks as a generic failure — each keeper operation returns one
//! of these, never an opaque string.

use thiserror::Error;

/// Errors a [`crate::keeper::LandKeeperHandle`] operation can return.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LandError {
    /// The `path_hash_table` version in use does not match the caller's.
    #[error("schema mismatch")]
    SchemaMismatch,
    /// Auth resolver refused, or the session is not bound to a player.
    #[error("unauthorized")]
    Unauthorized,
    /// Unknown `type_identifier` or malformed payload.
    #[error("invalid action")]
    InvalidAction,
    /// The land is at `max_players`.
    #[error("capacity exceeded")]
    CapacityExceeded,
    /// The player rebound a session it is already joined with.
    #[error("already joined")]
    AlreadyJoined,
    /// Per-session action rate cap exceeded.
    #[error("rate limited")]
    RateLimited,
    /// The command's deadline passed before it reached the front of the queue.
    #[error("timeout")]
    Timeout,
    /// A sync-flush codec failure that persisted across the one retry.
    #[error("encode error")]
    EncodeError,
    /// Transport failed to drain a session's outbound queue in time.
    #[error("send timeout")]
    SendTimeout,
    /// `instance_id` did not decode to a valid replay descriptor.
    #[error("invalid replay session")]
    InvalidReplaySession,
    /// The keeper is `Draining` or `Terminated` and accepts no new commands.
    #[error("shutting down")]
    ShuttingDown,
    /// [`crate::record::ReevaluationEntry`] history was requested but the
    /// recorder is not enabled for this keeper.
    #[error("recorder disabled")]
    RecorderDisabled,
    /// A rule body needed data only obtainable asynchronously; rule bodies
    /// must be synchronous (`spec.md` §5 "Suspension points").
    #[error("needs async")]
    NeedsAsync,
    /// A rule body panicked. The keeper has transitioned to `Draining`;
    /// other keepers are unaffected (`spec.md` §7 propagation policy).
    #[error("internal fault")]
    InternalFault,
}
