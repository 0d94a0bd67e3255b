// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Opaque identifiers (`spec.md` §3 Data Model).

use std::fmt;

/// Logical player identity; may rebind to a new [`SessionId`] on reconnect.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One transport connection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A per-connection client instance, distinct from the session that carries it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `(land_type, instance_id)`. Unique across the process.
///
/// `instance_id` is opaque except that a replay session encodes a record
/// descriptor into it, decoded by a resolver supplied at land-type
/// registration (`spec.md` §6 "Path descriptor").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LandId {
    /// The registered land-type name.
    pub land_type: String,
    /// Opaque per-instance identifier.
    pub instance_id: String,
}

impl LandId {
    /// Builds a `LandId` from its two parts.
    #[must_use]
    pub fn new(land_type: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            land_type: land_type.into(),
            instance_id: instance_id.into(),
        }
    }
}

impl fmt::Display for LandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.land_type, self.instance_id)
    }
}

/// Monotonically increasing tick counter, starting at 0 on keeper construction.
pub type Tick = i64;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn land_id_displays_as_type_slash_instance() {
        let id = LandId::new("arena", "abc123");
        assert_eq!(id.to_string(), "arena/abc123");
    }
}
