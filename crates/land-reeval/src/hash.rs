// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stable canonical hashing of a broadcast projection ([`SnapshotValue`]).

use land_state::SnapshotValue;

/// A content digest of a broadcast projection at the end of a tick.
///
/// Two snapshots that are logically equal always hash identically:
/// [`SnapshotValue::Object`] is `BTreeMap`-backed, so key order never
/// leaks into the digest, and every variant is tagged before its payload
/// so `"ab"` + `""` never collides with `""` + `"ab"`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StateHash(pub [u8; 32]);

impl StateHash {
    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Computes the canonical hash of a broadcast projection.
#[must_use]
pub fn canonical_hash(value: &SnapshotValue) -> StateHash {
    let mut hasher = blake3::Hasher::new();
    hash_into(&mut hasher, value);
    StateHash(*hasher.finalize().as_bytes())
}

fn write_len_prefixed(hasher: &mut blake3::Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn hash_into(hasher: &mut blake3::Hasher, value: &SnapshotValue) {
    match value {
        SnapshotValue::Null => {
            hasher.update(&[0]);
        }
        SnapshotValue::Bool(b) => {
            hasher.update(&[1, u8::from(*b)]);
        }
        SnapshotValue::Int(i) => {
            hasher.update(&[2]);
            hasher.update(&i.to_le_bytes());
        }
        SnapshotValue::Float(f) => {
            hasher.update(&[3]);
            hasher.update(&f.to_le_bytes());
        }
        SnapshotValue::String(s) => {
            hasher.update(&[4]);
            write_len_prefixed(hasher, s.as_bytes());
        }
        SnapshotValue::Bytes(b) => {
            hasher.update(&[5]);
            write_len_prefixed(hasher, b);
        }
        SnapshotValue::Array(items) => {
            hasher.update(&[6]);
            hasher.update(&(items.len() as u64).to_le_bytes());
            for item in items {
                hash_into(hasher, item);
            }
        }
        SnapshotValue::Object(fields) => {
            hasher.update(&[7]);
            hasher.update(&(fields.len() as u64).to_le_bytes());
            for (key, field) in fields {
                write_len_prefixed(hasher, key.as_bytes());
                hash_into(hasher, field);
            }
        }
    }
}
