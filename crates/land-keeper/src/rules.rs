// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`LandServer`]: the dyn-compatible per-land-type rule boundary
//! (`spec.md` §9 "Dynamic dispatch over heterogeneous state types").
//!
//! Rule bodies (`on_join`, `on_leave`, `handle_action`, `tick`) are modeled as
//! synchronous functions over `(state, ctx) -> Result` (`spec.md` §9
//! "Coroutines / async control flow"). A rule that needs data only
//! obtainable asynchronously must reject with [`LandError::NeedsAsync`]
//! rather than suspend; any I/O it needs is read from [`RuleContext::services`],
//! an immutable bag indexed by concrete type, never performed directly.

use std::any::Any;

use land_state::{DirtyTracker, NodeSchema, StateNode};

use crate::error::LandError;
use crate::ids::{ClientId, PlayerId, SessionId, Tick};

/// One client-submitted action (`spec.md` §6 `action` wire kind).
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEnvelope {
    /// Client-correlated request id, echoed back on the response.
    pub request_id: u64,
    /// Which registered action this is.
    pub type_identifier: String,
    /// Action-specific payload.
    pub payload: land_state::SnapshotValue,
}

/// The successful result of a dispatched action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    /// Action-specific result payload.
    pub result: land_state::SnapshotValue,
}

/// A server-originated event (`spec.md` §6 `serverEvent` wire kind).
#[derive(Debug, Clone, PartialEq)]
pub struct ServerEvent {
    /// Which registered event this is.
    pub type_identifier: String,
    /// Event-specific payload.
    pub payload: land_state::SnapshotValue,
}

/// Immutable context threaded through every rule invocation.
///
/// `services` is read-only by design (`spec.md` §9 "Global state" forbids
/// process-wide singletons; services are passed explicitly at registration
/// instead) — rules downcast it to whatever concrete service bundle their
/// land type was registered with.
pub struct RuleContext<'a> {
    /// The tick this invocation runs under.
    pub tick: Tick,
    /// Opaque, land-type-specific service bundle.
    pub services: &'a (dyn Any + Send + Sync),
}

/// Everything one `Tick` or `HandleAction` rule invocation produced, besides
/// its direct return value: server events to deliver and whether the keeper
/// should schedule a sync flush once this item finishes.
///
/// `spec.md` §9: "rules produce intents ... rather than performing I/O
/// directly" — this is that intent list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleEffects {
    /// Server events emitted by this invocation, in emission order.
    pub events: Vec<ServerEvent>,
    /// Whether this invocation requests a sync flush after it completes.
    pub request_sync: bool,
}

impl RuleEffects {
    /// An effect set with no events and no sync request.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Appends `event` to the emitted list.
    pub fn emit(&mut self, event: ServerEvent) {
        self.events.push(event);
    }

    /// Marks that a sync flush should run after this invocation.
    pub fn request_sync(&mut self) {
        self.request_sync = true;
    }
}

/// The per-land-type rule boundary a [`crate::keeper::LandKeeperHandle`]
/// dispatches through. Every land type implements this once and registers a
/// `Box<dyn LandServer>` factory with the land router.
pub trait LandServer: Send {
    /// This land type's fixed schema (`spec.md` §3 `StateNode` invariant:
    /// shape fixed at registration, only values/cardinalities mutate).
    fn schema(&self) -> &NodeSchema;

    /// The live state tree.
    fn state(&self) -> &StateNode;

    /// Mutable access to the live state tree, for rule bodies only.
    fn state_mut(&mut self) -> &mut StateNode;

    /// The dirty tracker rule bodies record ops into.
    fn dirty_tracker_mut(&mut self) -> &mut DirtyTracker;

    /// Runs the `OnJoin` rule for a newly joining player.
    ///
    /// # Errors
    /// Returns [`LandError::CapacityExceeded`] or [`LandError::AlreadyJoined`]
    /// per `spec.md` §4.E's `on_join` error set, or any other `LandError` the
    /// land type's own validation produces.
    fn on_join(
        &mut self,
        player: &PlayerId,
        session: &SessionId,
        ctx: &RuleContext<'_>,
    ) -> Result<RuleEffects, LandError>;

    /// Runs the `OnLeave` rule. Idempotent: leaving a player not present is a
    /// no-op, not an error (`spec.md` §4.E `on_leave`).
    fn on_leave(&mut self, player: &PlayerId, session: &SessionId, ctx: &RuleContext<'_>) -> RuleEffects;

    /// Dispatches one client action to this land type's rule body.
    ///
    /// # Errors
    /// Returns [`LandError::InvalidAction`] for an unrecognized
    /// `type_identifier` or malformed payload, or any other `LandError` the
    /// rule body itself raises.
    fn handle_action(
        &mut self,
        player: &PlayerId,
        client: &ClientId,
        session: &SessionId,
        action: &ActionEnvelope,
        ctx: &RuleContext<'_>,
    ) -> Result<(ActionOutcome, RuleEffects), LandError>;

    /// Advances the land's `Tick` rule by `delta_ticks` (> 1 when the keeper
    /// coalesced pending ticks under backpressure).
    ///
    /// # Errors
    /// Returns a `LandError` if the tick rule itself rejects its input; this
    /// is rare since ticks carry no caller-supplied payload to validate.
    fn tick(&mut self, delta_ticks: u32, ctx: &RuleContext<'_>) -> Result<RuleEffects, LandError>;
}
