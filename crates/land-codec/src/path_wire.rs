// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wire representation of [`FieldPath`] and the `PathForm` parameter that
//! unifies the legacy/path-hash encoder variants (`spec.md` §9, Open
//! Question 1 — see this crate's `DESIGN.md` entry for the pinned
//! resolution).

use serde::{Deserialize, Serialize};

use land_state::{FieldPath, PathHashTable, PathSegment};

use crate::error::CodecError;

/// Whether a codec addresses fields by literal string path or by a
/// `path_hash_table`-derived `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathForm {
    /// `spec.md` §6 `opcodeJsonArrayLegacy` form: full dotted path string.
    Literal,
    /// `spec.md` §6 path-hash form: `u32` template hash plus the dynamic
    /// key/index segments the template wildcards, in path order.
    Hashed,
}

/// A key or index segment a `Hashed` path could not fold into its template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum WireKey {
    /// A map key segment.
    #[serde(rename = "k")]
    Key(String),
    /// An array index segment.
    #[serde(rename = "i")]
    Index(u64),
}

/// `PathForm::Hashed`'s wire shape: a bare `u32` cannot disambiguate
/// `players.a` from `players.b` once both reduce to template `players.*`,
/// so the hashed form carries the template hash *and* the dynamic parts the
/// template erased, always as a 2-tuple even when `dynamic_parts` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashedPath {
    /// Stable hash of the path's template string.
    pub template_hash: u32,
    /// Concrete key/index segments, in path order.
    pub dynamic_parts: Vec<WireKey>,
}

/// Wire form of a [`FieldPath`], tagged by [`PathForm`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum WirePath {
    /// `PathForm::Literal`.
    #[serde(rename = "l")]
    Literal(String),
    /// `PathForm::Hashed`.
    #[serde(rename = "h")]
    Hashed(HashedPath),
}

/// Encodes `path` per `form`, looking up its template hash in `table` when
/// `form` is [`PathForm::Hashed`].
///
/// # Errors
/// Returns [`CodecError::SchemaMismatch`] if `path`'s template is not
/// registered in `table` — the path-hash table version the peers share has
/// diverged from the schema actually in use.
pub fn encode_path(path: &FieldPath, form: PathForm, table: &PathHashTable) -> Result<WirePath, CodecError> {
    match form {
        PathForm::Literal => Ok(WirePath::Literal(path.to_literal_string())),
        PathForm::Hashed => {
            let template_hash = table.hash_of(path).ok_or(CodecError::SchemaMismatch)?;
            let dynamic_parts = path
                .dynamic_parts()
                .into_iter()
                .map(|segment| match segment {
                    PathSegment::Key(key) => WireKey::Key(key),
                    PathSegment::Index(index) => WireKey::Index(index as u64),
                    PathSegment::Name(_) => unreachable!("dynamic_parts excludes Name segments"),
                })
                .collect();
            Ok(WirePath::Hashed(HashedPath {
                template_hash,
                dynamic_parts,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn hashed_form_carries_dynamic_parts_even_when_empty() {
        let table = PathHashTable::build(vec!["players".to_string()]).expect("no collisions");
        let path = FieldPath(vec![PathSegment::Name("players".to_string())]);
        let wire = encode_path(&path, PathForm::Hashed, &table).expect("registered template");
        match wire {
            WirePath::Hashed(hashed) => assert!(hashed.dynamic_parts.is_empty()),
            WirePath::Literal(_) => panic!("expected hashed form"),
        }
    }

    #[test]
    fn hashed_form_disambiguates_same_template_different_keys() {
        let table = PathHashTable::build(vec!["players.*.hp".to_string()]).expect("no collisions");
        let path_a = FieldPath(vec![
            PathSegment::Name("players".to_string()),
            PathSegment::Key("a".to_string()),
            PathSegment::Name("hp".to_string()),
        ]);
        let path_b = FieldPath(vec![
            PathSegment::Name("players".to_string()),
            PathSegment::Key("b".to_string()),
            PathSegment::Name("hp".to_string()),
        ]);
        let wire_a = encode_path(&path_a, PathForm::Hashed, &table).expect("registered");
        let wire_b = encode_path(&path_b, PathForm::Hashed, &table).expect("registered");
        assert_ne!(wire_a, wire_b);
        if let (WirePath::Hashed(a), WirePath::Hashed(b)) = (wire_a, wire_b) {
            assert_eq!(a.template_hash, b.template_hash);
            assert_ne!(a.dynamic_parts, b.dynamic_parts);
        }
    }

    #[test]
    fn unregistered_template_is_schema_mismatch() {
        let table = PathHashTable::build(vec!["other".to_string()]).expect("no collisions");
        let path = FieldPath(vec![PathSegment::Name("players".to_string())]);
        let err = encode_path(&path, PathForm::Hashed, &table).unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch));
    }
}
