// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The `stateUpdate` payload envelope (`spec.md` §6): `firstSync{snapshot}`
//! or `diff{ops[]}`, codec-specific beyond that.

use serde::{Deserialize, Serialize};

use crate::op_wire::WireOp;
use crate::value_wire::WireValue;

/// One `stateUpdate` message body, tagged by `kind`.
///
/// `jsonObject`'s diff variant carries the full tree again (`spec.md` §4.D:
/// "diff variant includes full tree for jsonObject mode"); the opcode
/// variants carry `ops` instead. Both fields are present in the type so one
/// envelope shape serves every encoder — unused fields are omitted on the
/// wire via `skip_serializing_if`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WireEnvelope {
    /// First sync after join: always a full broadcast-projection snapshot.
    FirstSync {
        /// Full broadcast projection.
        tree: WireValue,
    },
    /// A subsequent sync flush.
    Diff {
        /// Opcode list (opcode encoder variants). Empty for `jsonObject`.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        ops: Vec<WireOp>,
        /// Full tree (`jsonObject` only).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tree: Option<WireValue>,
    },
}
