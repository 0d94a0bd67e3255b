// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scale factor and safe-range constants shared across the math kernel.

/// Fixed-point scale factor: `1.0` in world units quantizes to `SCALE`.
pub const SCALE: i32 = 1000;

/// Largest world coordinate that guarantees `dx*dx + dy*dy` (and the 3D sum
/// of three such terms) fits in `i64` for any two points in range.
///
/// `i32::MAX / 2` squared and summed three times is comfortably under
/// `i64::MAX`; see `land-math/tests/contracts.rs` for the exhaustive check
/// at the boundary.
pub const WORLD_MAX: i32 = i32::MAX / 2;

/// Largest radius for which `center ± radius` cannot overflow `i32`.
pub const MAX_CIRCLE_RADIUS: i32 = i32::MAX;

/// Deprecated "safe max" bound from the pre-widening implementation, kept
/// only so round-trip tests that pin historical behavior still compile.
/// New code must use [`WORLD_MAX`] instead: every product-producing
/// operation in this crate widens to `i64` before multiplying, so this
/// bound is no longer enforced anywhere.
#[deprecated(note = "superseded by WORLD_MAX; intermediates now widen to i64")]
pub const MAX_SAFE_I32: i32 = 46340; // floor(sqrt(i32::MAX))
