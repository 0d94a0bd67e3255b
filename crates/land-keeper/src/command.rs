// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The command enum carried over the keeper's `mpsc` queue — the one and
//! only way anything outside the actor task touches its state
//! (`spec.md` §4.E: "all state mutation happens on its task, in strict FIFO
//! of accepted commands").

use std::sync::Arc;

use tokio::sync::oneshot;

use land_reeval::ReevaluationEntry;
use land_state::SnapshotValue;

use crate::error::LandError;
use crate::ids::{ClientId, PlayerId, SessionId};
use crate::publish::DirtyPublisher;
use crate::rules::{ActionEnvelope, ActionOutcome, ServerEvent};

/// Reply channel for a command; `Err` means the sender dropped without
/// reading, which callers treat the same as `LandError::Timeout`.
pub(crate) type Reply<T> = oneshot::Sender<T>;

/// One entry on the keeper's command queue.
pub(crate) enum Command {
    /// `handle_action` (`spec.md` §4.E).
    HandleAction {
        player: PlayerId,
        client: ClientId,
        session: SessionId,
        action: ActionEnvelope,
        reply: Reply<Result<ActionOutcome, LandError>>,
    },
    /// `on_join`.
    OnJoin {
        player: PlayerId,
        session: SessionId,
        reply: Reply<Result<(), LandError>>,
    },
    /// `on_leave`. Idempotent — always succeeds.
    OnLeave {
        player: PlayerId,
        session: SessionId,
        reply: Reply<()>,
    },
    /// `step_tick_once`.
    StepTickOnce { reply: Reply<()> },
    /// `request_sync_flush`.
    RequestSyncFlush { reply: Reply<()> },
    /// Returns the current broadcast-projection snapshot, for a transport's
    /// initial `firstSync` to a newly bound player.
    GetSnapshot { reply: Reply<SnapshotValue> },
    /// `set_transport`.
    SetTransport {
        publisher: Arc<dyn DirtyPublisher>,
        reply: Reply<()>,
    },
    /// `get_reevaluation_record`.
    GetReevaluationRecord {
        reply: Reply<Result<Vec<ReevaluationEntry<ActionEnvelope, ServerEvent>>, LandError>>,
    },
    /// `shutdown`.
    Shutdown { reply: Reply<()> },
}
