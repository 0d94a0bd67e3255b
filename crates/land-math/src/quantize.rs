// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Quantization contract: the wire boundary between `f32` authoring values
//! and the `i32` fixed-point representation every peer agrees on.
//!
//! `quantize` multiplies by [`SCALE`](crate::SCALE) and rounds *ties away
//! from zero* — the same rule `f32::round` already implements, so this is
//! pinned rather than reimplemented. `dequantize` divides back down as
//! `f32`. Every peer (server, replay, client) must reach the same `i32` for
//! the same `f32` input: this is part of the wire contract, not an
//! implementation detail.

use crate::constants::SCALE;

/// Converts a world-space `f32` value into its fixed-point `i32`
/// representation, rounding ties away from zero.
///
/// Non-finite inputs (`NaN`, `±inf`) saturate to `0`/`i32::MIN`/`i32::MAX`
/// per Rust's `as` cast semantics, which keeps this function total.
#[must_use]
pub fn quantize(value: f32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation)]
    let scaled = (value * SCALE as f32).round();
    scaled as i32
}

/// Converts a fixed-point `i32` value back into world-space `f32`.
#[must_use]
pub fn dequantize(value: i32) -> f32 {
    value as f32 / SCALE as f32
}

/// Multiplies two `i32` values, widening to `i64` and saturating the result
/// back into `i32` range instead of wrapping.
///
/// Use this wherever a product must stay representable as a scalar `i32`
/// (e.g. scaling a quantized coordinate by a non-unit factor); for dot
/// products, cross products, and squared distances, widen to `i64` and keep
/// the wider type instead — see [`crate::vec`].
#[must_use]
pub fn multiply_safe(a: i32, b: i32) -> i32 {
    let wide = i64::from(a) * i64::from(b);
    wide.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
