// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]

use land_math::{dequantize, quantize, IVec2, IVec3, WORLD_MAX};
use proptest::prelude::*;

proptest! {
    #[test]
    fn dequantize_of_quantize_stays_within_one_tick(raw in -2_000_000_000i32..2_000_000_000i32) {
        let value = dequantize(raw);
        let back = quantize(value);
        prop_assert!((i64::from(back) - i64::from(raw)).abs() <= 1);
    }

    #[test]
    fn vec2_distance_squared_never_negative(
        ax in -WORLD_MAX..WORLD_MAX,
        ay in -WORLD_MAX..WORLD_MAX,
        bx in -WORLD_MAX..WORLD_MAX,
        by in -WORLD_MAX..WORLD_MAX,
    ) {
        let a = IVec2::new(ax, ay);
        let b = IVec2::new(bx, by);
        prop_assert!(a.distance_squared(b) >= 0);
    }

    #[test]
    fn vec3_distance_squared_never_negative(
        ax in -WORLD_MAX..WORLD_MAX, ay in -WORLD_MAX..WORLD_MAX, az in -WORLD_MAX..WORLD_MAX,
        bx in -WORLD_MAX..WORLD_MAX, by in -WORLD_MAX..WORLD_MAX, bz in -WORLD_MAX..WORLD_MAX,
    ) {
        let a = IVec3::new(ax, ay, az);
        let b = IVec3::new(bx, by, bz);
        prop_assert!(a.distance_squared(b) >= 0);
    }
}

#[test]
fn world_max_keeps_distance_squared_in_i64_range() {
    let a = IVec2::new(-WORLD_MAX, -WORLD_MAX);
    let b = IVec2::new(WORLD_MAX, WORLD_MAX);
    let d = a.distance_squared(b);
    assert!(d > 0);
    assert!(d < i64::MAX);
}
