// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Codec errors.

/// Failures an [`crate::encoder::Encoder`] can report.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The `path_hash_table` in use does not cover a path this diff
    /// references — the schema version has drifted between peers
    /// (`spec.md` §7 `schema_mismatch`).
    #[error("schema mismatch: path_hash_table does not cover a referenced path")]
    SchemaMismatch,
    /// The underlying JSON serializer failed.
    #[error("json encode failed: {0}")]
    Json(#[from] serde_json::Error),
    /// The underlying MessagePack serializer failed.
    #[error("messagepack encode failed: {0}")]
    MessagePack(#[from] rmp_serde::encode::Error),
}
