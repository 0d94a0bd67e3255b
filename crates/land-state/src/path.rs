// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`FieldPath`] and the [`PathHashTable`] that maps path *templates* to
//! stable 32-bit identifiers.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One segment of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// A named composite field.
    Name(String),
    /// An index into an ordered array.
    Index(usize),
    /// A key into a map.
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Index(index) => write!(f, "[{index}]"),
            Self::Key(key) => write!(f, "{key}"),
        }
    }
}

/// An ordered sequence of segments uniquely identifying a leaf or subtree
/// inside one land's state tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FieldPath(pub Vec<PathSegment>);

impl FieldPath {
    /// The empty (root) path.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    /// Renders this path as a literal, dot-joined string (the `legacy`
    /// wire representation): `players.a.hp`, `items[3].name`.
    #[must_use]
    pub fn to_literal_string(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
                PathSegment::Name(_) | PathSegment::Key(_) => {
                    if i > 0 {
                        out.push('.');
                    }
                    out.push_str(&segment.to_string());
                }
            }
        }
        out
    }

    /// Renders this path's *template* — `Key`/`Index` segments replaced by
    /// `*` — the canonical string a [`PathHashTable`] hashes.
    #[must_use]
    pub fn to_template_string(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.0.iter().enumerate() {
            let rendered: &str = match segment {
                PathSegment::Name(name) => name.as_str(),
                PathSegment::Index(_) | PathSegment::Key(_) => "*",
            };
            if i > 0 {
                out.push('.');
            }
            out.push_str(rendered);
        }
        out
    }

    /// The concrete (non-wildcarded) key/index segments in this path, in
    /// order — the part a path-hash template cannot recover on its own.
    #[must_use]
    pub fn dynamic_parts(&self) -> Vec<PathSegment> {
        self.0
            .iter()
            .filter(|s| matches!(s, PathSegment::Index(_) | PathSegment::Key(_)))
            .cloned()
            .collect()
    }
}

/// FNV-1a 32-bit hash. Deterministic across platforms and Rust versions —
/// unlike `std::hash::Hash`, whose default hasher is explicitly randomized
/// and unsuitable for a wire-stable identifier.
#[must_use]
pub fn fnv1a32(bytes: &[u8]) -> u32 {
    const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Bidirectional map between path templates and their stable 32-bit
/// identifiers, precomputed once per schema at land-type registration and
/// immutable thereafter (see `spec.md` §5, "shared-resource policy").
#[derive(Debug, Clone, Default)]
pub struct PathHashTable {
    template_to_hash: HashMap<String, u32>,
    hash_to_template: HashMap<u32, String>,
}

/// A path template hashed to a `u32` that collides with one already present
/// under a different template.
#[derive(Debug, thiserror::Error)]
#[error("path hash collision: template {new_template:?} and {existing_template:?} both hash to {hash}")]
pub struct PathHashCollision {
    /// The offending hash value.
    pub hash: u32,
    /// The template already registered under `hash`.
    pub existing_template: String,
    /// The template that collided with it.
    pub new_template: String,
}

impl PathHashTable {
    /// Builds a table from every path template a schema can produce.
    ///
    /// # Errors
    /// Returns [`PathHashCollision`] if two distinct templates hash to the
    /// same `u32` — exceedingly unlikely for FNV-1a over a land's field
    /// count, but checked rather than assumed, since a silent collision
    /// would misroute a diff on the wire.
    pub fn build(templates: impl IntoIterator<Item = String>) -> Result<Self, PathHashCollision> {
        let mut table = Self::default();
        for template in templates {
            table.insert(template)?;
        }
        Ok(table)
    }

    fn insert(&mut self, template: String) -> Result<(), PathHashCollision> {
        let hash = fnv1a32(template.as_bytes());
        if let Some(existing) = self.hash_to_template.get(&hash) {
            if existing != &template {
                return Err(PathHashCollision {
                    hash,
                    existing_template: existing.clone(),
                    new_template: template,
                });
            }
            return Ok(());
        }
        self.hash_to_template.insert(hash, template.clone());
        self.template_to_hash.insert(template, hash);
        Ok(())
    }

    /// Looks up the hash for a path's template.
    #[must_use]
    pub fn hash_of(&self, path: &FieldPath) -> Option<u32> {
        self.template_to_hash.get(&path.to_template_string()).copied()
    }

    /// Looks up the template string registered under `hash`.
    #[must_use]
    pub fn template_of(&self, hash: u32) -> Option<&str> {
        self.hash_to_template.get(&hash).map(String::as_str)
    }

    /// Number of distinct templates registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.template_to_hash.len()
    }

    /// Returns `true` if no templates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.template_to_hash.is_empty()
    }
}
