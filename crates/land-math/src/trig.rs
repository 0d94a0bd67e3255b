// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deterministic CORDIC `sin`/`cos`/`atan2`, and a float-free integer `sqrt`.
//!
//! Like the rest of this crate, these functions must never call a platform
//! transcendental (`f32::sin`, `libm::atan2`, ...): those can differ by a few
//! ULPs across hardware and toolchains, which is fatal to a wire contract
//! that ships raw integers between server, replay, and client. Instead this
//! module runs a fixed iteration count of CORDIC rotation/vectoring over a
//! checked-in arctangent table, so every peer executes the exact same
//! integer operations in the exact same order.

/// CORDIC iteration count. Fixed so the gain constant and error bound below
/// are meaningful; changing this without updating [`CORDIC_GAIN`] and the
/// arctangent table breaks the `±5`-unit accuracy contract.
const CORDIC_ITERATIONS: usize = 24;

/// Scale factor for trigonometric outputs: `sin`/`cos` are returned as `i32`
/// in `[-TRIG_SCALE, TRIG_SCALE]`.
pub const TRIG_SCALE: i64 = 1_000_000;

/// CORDIC gain `K ≈ 0.607253`, scaled by [`TRIG_SCALE`]. Pre-multiplying the
/// initial `x` register by this constant folds the CORDIC pseudo-rotation
/// gain into the result, so the final `(x, y)` registers are directly
/// `(cos, sin)` without a separate normalization pass.
const CORDIC_GAIN: i64 = 607253;

/// `atan(2^-i)` for `i` in `0..24`, in degrees scaled by [`TRIG_SCALE`],
/// rounded to the nearest integer. Checked in as a table (never computed at
/// runtime) for the same reason the rest of this module avoids
/// transcendentals: determinism.
const ATAN_TABLE_DEG_SCALED: [i64; CORDIC_ITERATIONS] = [
    45_000_000, 26_565_051, 14_036_243, 7_125_016, 3_576_334, 1_789_911, 895_174, 447_614,
    223_808, 111_902, 55_951, 27_976, 13_988, 6_994, 3_497, 1_748, 874, 437, 219, 109, 55, 27,
    14, 7,
];

const DEGREES_PER_TURN_SCALED: i64 = 360 * TRIG_SCALE;
const HALF_TURN_SCALED: i64 = 180 * TRIG_SCALE;
const QUARTER_TURN_SCALED: i64 = 90 * TRIG_SCALE;

/// Rounds `n / d` to the nearest integer, ties away from zero, for `d > 0`.
fn div_round(n: i64, d: i64) -> i64 {
    let q = n / d;
    let r = n % d;
    if r * 2 >= d {
        q + 1
    } else if r * 2 <= -d {
        q - 1
    } else {
        q
    }
}

/// Normalizes a degree value scaled by [`TRIG_SCALE`] into `(-180°, 180°]`.
fn normalize_degrees_scaled(value: i64) -> i64 {
    let mut r = value.rem_euclid(DEGREES_PER_TURN_SCALED);
    if r > HALF_TURN_SCALED {
        r -= DEGREES_PER_TURN_SCALED;
    }
    r
}

/// Runs CORDIC rotation mode starting from `z` (degrees, scaled by
/// [`TRIG_SCALE`]), assumed already reduced to `[-90°, 90°]`. Returns
/// `(cos, sin)` scaled by [`TRIG_SCALE`].
fn cordic_rotate(z0: i64) -> (i64, i64) {
    let mut x = CORDIC_GAIN;
    let mut y: i64 = 0;
    let mut z = z0;
    for (i, &atan_i) in ATAN_TABLE_DEG_SCALED.iter().enumerate() {
        let d: i64 = if z >= 0 { 1 } else { -1 };
        let shift = i as u32;
        let x_next = x - d * (y >> shift);
        let y_next = y + d * (x >> shift);
        z -= d * atan_i;
        x = x_next;
        y = y_next;
    }
    (x, y)
}

/// Deterministic `sin` and `cos` of a fixed-point degree angle.
///
/// `angle_deg_scaled` is in fixed-point degrees (scale `S = 1000`, matching
/// the rest of the wire contract): `90_000` means 90°. The returned
/// `(sin, cos)` pair is scaled by [`TRIG_SCALE`] (`1_000_000`) and accurate
/// to within ±5 scaled units of the ideal value at every angle.
#[must_use]
pub fn sin_cos_degrees(angle_deg_scaled: i32) -> (i32, i32) {
    // Convert from the wire's degree-scale-1000 to CORDIC's degree-scale-1e6.
    let angle_scaled = i64::from(angle_deg_scaled) * (TRIG_SCALE / 1000);
    let reduced = normalize_degrees_scaled(angle_scaled);

    let (z, flip) = if reduced > QUARTER_TURN_SCALED {
        (reduced - HALF_TURN_SCALED, true)
    } else if reduced < -QUARTER_TURN_SCALED {
        (reduced + HALF_TURN_SCALED, true)
    } else {
        (reduced, false)
    };

    let (mut cos, mut sin) = cordic_rotate(z);
    if flip {
        cos = -cos;
        sin = -sin;
    }

    let clamp = |v: i64| v.clamp(-TRIG_SCALE, TRIG_SCALE);
    #[allow(clippy::cast_possible_truncation)]
    let result = (clamp(sin) as i32, clamp(cos) as i32);
    result
}

/// Deterministic four-quadrant arctangent.
///
/// `atan2_degrees(0, 0) = 0`. Otherwise returns the angle of `(x, y)` in
/// fixed-point degrees (scale `S = 1000`) in the range `(-180_000, 180_000]`.
#[must_use]
pub fn atan2_degrees(y: i64, x: i64) -> i32 {
    if x == 0 && y == 0 {
        return 0;
    }

    // CORDIC vectoring mode converges for x >= 0; rotate 180° first otherwise.
    let (cx, cy, offset_scaled) = if x < 0 { (-x, -y, HALF_TURN_SCALED) } else { (x, y, 0) };

    let mut vx = cx;
    let mut vy = cy;
    let mut z: i64 = 0;
    for (i, &atan_i) in ATAN_TABLE_DEG_SCALED.iter().enumerate() {
        let d: i64 = if vy < 0 { 1 } else { -1 };
        let shift = i as u32;
        let x_next = vx - d * (vy >> shift);
        let y_next = vy + d * (vx >> shift);
        z -= d * atan_i;
        vx = x_next;
        vy = y_next;
    }

    let total = normalize_degrees_scaled(z + offset_scaled);
    #[allow(clippy::cast_possible_truncation)]
    let result = div_round(total, TRIG_SCALE / 1000) as i32;
    result
}

/// Integer square root via the classic bit-by-bit (digit-by-digit)
/// algorithm. No floating point, so it is exactly reproducible across
/// platforms.
///
/// Returns `0` for negative inputs and for `0`.
#[must_use]
pub fn sqrt_i64(value: i64) -> i64 {
    if value <= 0 {
        return 0;
    }
    let mut remainder = value;
    let mut root: i64 = 0;
    // Highest power-of-4 bit not exceeding value.
    let mut bit: i64 = 1 << (i64::BITS - 2);
    while bit > value {
        bit >>= 2;
    }
    while bit != 0 {
        let trial = root + bit;
        if remainder >= trial {
            remainder -= trial;
            root = (root >> 1) + bit;
        } else {
            root >>= 1;
        }
        bit >>= 2;
    }
    root
}
