// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The client-originated control envelope (`spec.md` §6): `join`, `leave`,
//! `action`, and the server's `joinResponse`/`actionResponse`/`serverEvent`
//! replies. `land-codec` deliberately covers only the `stateUpdate` kind
//! (`spec.md` §4.D); these control kinds are JSON, tagged the same way
//! `land-codec::WireEnvelope` tags `stateUpdate`, and reuse
//! [`land_codec::WireValue`] for payloads so one `SnapshotValue` mirror
//! serves both.
//!
//! One `land-service` process serves exactly one land instance, so unlike
//! `spec.md`'s `join` this `join` carries no `land_type`/`instance_id` —
//! there is only ever one land to join.

use land_codec::WireValue;
use serde::{Deserialize, Serialize};

/// One control-plane message, either direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ControlMessage {
    /// C→S: request to join as `player_id`.
    Join {
        /// Client-correlated id, echoed on `joinResponse`.
        request_id: u64,
        /// Player identity to join as.
        player_id: String,
    },
    /// C→S: request to leave.
    Leave {
        /// Client-correlated id.
        request_id: u64,
    },
    /// C→S: dispatch one action.
    Action {
        /// Client-correlated id, echoed on `actionResponse`.
        request_id: u64,
        /// Which registered action this is.
        type_identifier: String,
        /// Action-specific payload.
        payload: WireValue,
    },
    /// S→C: reply to `join`.
    JoinResponse {
        /// Echoes the `join`'s `request_id`.
        request_id: u64,
        /// Whether the join was accepted.
        accepted: bool,
        /// Rejection reason, present iff `accepted` is `false`.
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// S→C: reply to `action`.
    ActionResponse {
        /// Echoes the `action`'s `request_id`.
        request_id: u64,
        /// The action's result, present on success.
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<WireValue>,
        /// The failure reason, present on error.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// Encodes one [`ControlMessage`] to a JSON frame body (unframed — the
/// caller length-prefixes it for the wire).
///
/// # Errors
/// Returns a `serde_json::Error` if serialization fails, which it never
/// should for this enum.
pub fn encode(msg: &ControlMessage) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(msg)
}

/// Decodes one JSON frame body into a [`ControlMessage`].
///
/// # Errors
/// Returns a `serde_json::Error` for malformed or unrecognized input.
pub fn decode(bytes: &[u8]) -> Result<ControlMessage, serde_json::Error> {
    serde_json::from_slice(bytes)
}
