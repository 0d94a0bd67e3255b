// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`AuthInfoResolver`]: the boundary the adapter consumes to turn a
//! connection's `(path, uri)` into a player identity, without parsing any
//! token format itself (`spec.md` §4.F "Authentication boundary").
//!
//! Hand-written boxed-future trait rather than `async-trait`, matching the
//! manual `Pin<Box<dyn Future<...>>>` shape used elsewhere in this codebase
//! for dyn-safe async boundaries.

use std::future::Future;
use std::pin::Pin;

use land_keeper::PlayerId;
use land_state::SnapshotValue;

use crate::error::TransportError;

/// A future boxed for storage behind a trait object.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What an [`AuthInfoResolver`] returns for an accepted connection.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedInfo {
    /// The player this connection authenticates as.
    pub player_id: PlayerId,
    /// Resolver-specific metadata forwarded to `on_join`.
    pub metadata: SnapshotValue,
}

/// Resolves a connection's `(path, uri)` to an [`AuthenticatedInfo`], or
/// `None` to reject without a specific reason, or `Err` on resolver failure.
pub trait AuthInfoResolver: Send + Sync {
    /// Attempts to authenticate one connection.
    ///
    /// # Errors
    /// Returns [`TransportError::AuthFailed`] if the resolver itself could
    /// not complete (not to be confused with `Ok(None)`, a plain refusal).
    fn resolve<'a>(&'a self, path: &'a str, uri: &'a str) -> BoxFuture<'a, Result<Option<AuthenticatedInfo>, TransportError>>;
}
