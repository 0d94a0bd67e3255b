// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`DirtyPublisher`]: the narrow seam a `TransportAdapter` binds into a
//! keeper via `set_transport` (`spec.md` §4.E), without this crate ever
//! depending on `land-transport`'s concrete session/encoding machinery.

use land_state::{Op, SnapshotValue};

use crate::rules::ServerEvent;

/// Receives the effects of every command a keeper processes, in command
/// order. Implemented by `land-transport`'s adapter; the keeper only ever
/// sees this trait.
pub trait DirtyPublisher: Send + Sync {
    /// Ops a command produced, in recorded order. Called once per command
    /// that left the dirty tracker non-empty — never for a no-op command.
    fn notify_ops(&self, ops: &[Op]);

    /// Server events a command produced, in emission order.
    fn notify_events(&self, events: &[ServerEvent]);

    /// Called when a scheduled sync flush point is reached
    /// (`request_sync_flush` or the periodic sync timer upstream of this
    /// keeper). `snapshot` is the current broadcast projection.
    fn flush(&self, snapshot: &SnapshotValue);
}

/// A [`DirtyPublisher`] that drops every notification. The default binding
/// for a keeper before `set_transport` is called, and useful in tests that
/// don't exercise the transport seam.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPublisher;

impl DirtyPublisher for NullPublisher {
    fn notify_ops(&self, _ops: &[Op]) {}
    fn notify_events(&self, _events: &[ServerEvent]) {}
    fn flush(&self, _snapshot: &SnapshotValue) {}
}
