// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collision and bounding-volume primitives over [`IVec2`].
//!
//! All comparisons here are exact integer arithmetic (no floats, no
//! epsilon fudging) so that two peers evaluating the same collision query
//! against the same state always agree.

use crate::vec::IVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rounds `n / d` (`d > 0`) to the nearest integer, ties away from zero.
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

fn sign(v: i64) -> i8 {
    match v.cmp(&0) {
        core::cmp::Ordering::Less => -1,
        core::cmp::Ordering::Equal => 0,
        core::cmp::Ordering::Greater => 1,
    }
}

/// Axis-aligned bounding box over integer coordinates.
///
/// `min` components are always `<=` the corresponding `max` component;
/// [`IAabb2::from_corners`] enforces this by sorting rather than panicking
/// on an inverted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IAabb2 {
    /// Minimum corner.
    pub min: IVec2,
    /// Maximum corner.
    pub max: IVec2,
}

impl IAabb2 {
    /// Builds an AABB from two corners, sorting components so the
    /// invariant `min <= max` always holds regardless of input order.
    #[must_use]
    pub fn from_corners(a: IVec2, b: IVec2) -> Self {
        Self {
            min: IVec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: IVec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Returns `true` if this box overlaps `other`, inclusive of shared
    /// edges.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Returns `true` if `point` lies within this box, inclusive of edges.
    #[must_use]
    pub fn contains(&self, point: IVec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Returns a box expanded by `margin` on every side. Uses saturating
    /// arithmetic rather than wrapping: an expanded box that would overflow
    /// clamps to `i32` range instead of wrapping around into a bogus box.
    #[must_use]
    pub fn expanded(&self, margin: i32) -> Self {
        Self {
            min: IVec2::new(self.min.x.saturating_sub(margin), self.min.y.saturating_sub(margin)),
            max: IVec2::new(self.max.x.saturating_add(margin), self.max.y.saturating_add(margin)),
        }
    }

    /// Clamps `point` into this box.
    #[must_use]
    pub fn clamp(&self, point: IVec2) -> IVec2 {
        IVec2::new(point.x.clamp(self.min.x, self.max.x), point.y.clamp(self.min.y, self.max.y))
    }

    /// Area, widened to `i64` so a world-sized box cannot overflow.
    #[must_use]
    pub fn area(&self) -> i64 {
        let w = i64::from(self.max.x) - i64::from(self.min.x);
        let h = i64::from(self.max.y) - i64::from(self.min.y);
        w * h
    }
}

/// A circle over integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ICircle {
    /// Center point.
    pub center: IVec2,
    /// Radius. Must be non-negative; negative radii are treated as zero by
    /// every method here.
    pub radius: i32,
}

impl ICircle {
    /// Constructs a circle, clamping a negative radius to zero.
    #[must_use]
    pub fn new(center: IVec2, radius: i32) -> Self {
        Self { center, radius: radius.max(0) }
    }

    fn radius_squared(self) -> i64 {
        let r = i64::from(self.radius);
        r * r
    }

    /// Returns `true` if this circle overlaps `other`.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let r_sum = i64::from(self.radius) + i64::from(other.radius);
        self.center.distance_squared(other.center) <= r_sum * r_sum
    }

    /// Returns `true` if this circle overlaps `aabb`.
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &IAabb2) -> bool {
        let closest = aabb.clamp(self.center);
        self.center.distance_squared(closest) <= self.radius_squared()
    }

    /// Returns `true` if `point` lies within this circle, inclusive of the
    /// boundary.
    #[must_use]
    pub fn contains(&self, point: IVec2) -> bool {
        self.center.distance_squared(point) <= self.radius_squared()
    }

    /// Returns the tight axis-aligned bounding box of this circle.
    ///
    /// Uses saturating arithmetic: callers that stay within
    /// [`crate::WORLD_MAX`]/[`crate::MAX_CIRCLE_RADIUS`] never observe
    /// saturation, but this method itself never panics or wraps.
    #[must_use]
    pub fn bounding_aabb(&self) -> IAabb2 {
        IAabb2 {
            min: IVec2::new(
                self.center.x.saturating_sub(self.radius),
                self.center.y.saturating_sub(self.radius),
            ),
            max: IVec2::new(
                self.center.x.saturating_add(self.radius),
                self.center.y.saturating_add(self.radius),
            ),
        }
    }
}

/// A line segment between two integer points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ILineSegment {
    /// First endpoint.
    pub a: IVec2,
    /// Second endpoint.
    pub b: IVec2,
}

impl ILineSegment {
    /// Constructs a segment between two points.
    #[must_use]
    pub fn new(a: IVec2, b: IVec2) -> Self {
        Self { a, b }
    }

    /// Returns the closest point on this segment to `point`.
    #[must_use]
    pub fn closest_point(&self, point: IVec2) -> IVec2 {
        let ab = self.b - self.a;
        let len2 = ab.magnitude_squared();
        if len2 == 0 {
            return self.a;
        }
        let ap = point - self.a;
        let t = ap.dot(ab).clamp(0, len2);
        #[allow(clippy::cast_possible_truncation)]
        let dx = div_round(i64::from(ab.x) * t, len2) as i32;
        #[allow(clippy::cast_possible_truncation)]
        let dy = div_round(i64::from(ab.y) * t, len2) as i32;
        IVec2::new(self.a.x.wrapping_add(dx), self.a.y.wrapping_add(dy))
    }

    /// Squared distance from `point` to the closest point on this segment.
    #[must_use]
    pub fn distance_squared_to_point(&self, point: IVec2) -> i64 {
        self.closest_point(point).distance_squared(point)
    }

    /// Returns `true` if this segment intersects `other`, including
    /// touching endpoints and collinear overlap.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let (a1, b1, a2, b2) = (self.a, self.b, other.a, other.b);
        let o1 = sign((b1 - a1).cross(a2 - a1));
        let o2 = sign((b1 - a1).cross(b2 - a1));
        let o3 = sign((b2 - a2).cross(a1 - a2));
        let o4 = sign((b2 - a2).cross(b1 - a2));

        if o1 != o2 && o3 != o4 {
            return true;
        }

        (o1 == 0 && Self::on_segment(a1, b1, a2))
            || (o2 == 0 && Self::on_segment(a1, b1, b2))
            || (o3 == 0 && Self::on_segment(a2, b2, a1))
            || (o4 == 0 && Self::on_segment(a2, b2, b1))
    }

    /// Returns `true` if this segment intersects `circle`.
    #[must_use]
    pub fn intersects_circle(&self, circle: &ICircle) -> bool {
        let r = i64::from(circle.radius);
        self.distance_squared_to_point(circle.center) <= r * r
    }

    /// `p` must already be collinear with `a`/`b`; checks it falls within
    /// the bounding box of the segment.
    fn on_segment(a: IVec2, b: IVec2, p: IVec2) -> bool {
        p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
    }
}

/// A ray: an origin plus a direction, unbounded in `t >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IRay {
    /// Ray origin.
    pub origin: IVec2,
    /// Ray direction. Not required to be unit length; `t` is parametric
    /// along this vector's own scale.
    pub direction: IVec2,
}

impl IRay {
    /// Constructs a ray.
    #[must_use]
    pub fn new(origin: IVec2, direction: IVec2) -> Self {
        Self { origin, direction }
    }

    /// Intersects this ray against an AABB using the slab method, entirely
    /// in rational (numerator/denominator) integer arithmetic so no
    /// division happens until the final reconstruction.
    ///
    /// Returns the hit point and `t` scaled by [`crate::SCALE`]. If scaling
    /// `t` by `SCALE` would overflow `i64`, falls back to reconstructing the
    /// hit point directly from the unscaled rational `t` instead of
    /// silently truncating — per the crate's correctness contract, losing
    /// precision here is a bug, not an acceptable approximation.
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &IAabb2) -> Option<(IVec2, i64)> {
        // Slab bounds as rational t = num/den, den fixed at 1 throughout
        // (we keep a common unit denominator per axis and only form true
        // fractions when direction components are nonzero).
        let mut t_min_n: i64 = 0;
        let mut t_min_d: i64 = 1;
        let mut t_max_n: i64 = i64::MAX;
        let mut t_max_d: i64 = 1;

        for axis in 0..2 {
            let (origin, dir, lo, hi) = if axis == 0 {
                (self.origin.x, self.direction.x, aabb.min.x, aabb.max.x)
            } else {
                (self.origin.y, self.direction.y, aabb.min.y, aabb.max.y)
            };

            if dir == 0 {
                if i64::from(origin) < i64::from(lo) || i64::from(origin) > i64::from(hi) {
                    return None;
                }
                continue;
            }

            let (lo_n, hi_n) = (i64::from(lo) - i64::from(origin), i64::from(hi) - i64::from(origin));
            let (mut t1_n, mut t1_d) = (lo_n, i64::from(dir));
            let (mut t2_n, mut t2_d) = (hi_n, i64::from(dir));
            if t1_d < 0 {
                t1_n = -t1_n;
                t1_d = -t1_d;
            }
            if t2_d < 0 {
                t2_n = -t2_n;
                t2_d = -t2_d;
            }
            let (near_n, near_d, far_n, far_d) = if frac_le(t1_n, t1_d, t2_n, t2_d) {
                (t1_n, t1_d, t2_n, t2_d)
            } else {
                (t2_n, t2_d, t1_n, t1_d)
            };
            if frac_le(t_min_n, t_min_d, near_n, near_d) {
                t_min_n = near_n;
                t_min_d = near_d;
            }
            if frac_le(far_n, far_d, t_max_n, t_max_d) {
                t_max_n = far_n;
                t_max_d = far_d;
            }
        }

        if !frac_le(t_min_n, t_min_d, t_max_n, t_max_d) {
            return None;
        }
        if !frac_le(0, 1, t_max_n, t_max_d) {
            return None;
        }

        Some(self.reconstruct_hit(t_min_n, t_min_d))
    }

    /// Intersects this ray against a circle.
    ///
    /// Same rational-arithmetic / overflow-fallback contract as
    /// [`Self::intersects_aabb`].
    #[must_use]
    pub fn intersects_circle(&self, circle: &ICircle) -> Option<(IVec2, i64)> {
        // Solve |origin + t*dir - center|^2 = r^2 for the smallest t >= 0.
        let oc = self.origin - circle.center;
        let d = self.direction;
        let a = d.magnitude_squared();
        if a == 0 {
            return None;
        }
        let b = 2 * oc.dot(d);
        let c = oc.magnitude_squared() - i64::from(circle.radius) * i64::from(circle.radius);
        let disc = b * b - 4 * a * c;
        if disc < 0 {
            return None;
        }
        let sqrt_disc = crate::trig::sqrt_i64(disc);
        // Smallest non-negative root of (-b +/- sqrt_disc) / (2a).
        let candidates = [-b - sqrt_disc, -b + sqrt_disc];
        let mut best: Option<(i64, i64)> = None;
        for num in candidates {
            if num < 0 {
                continue;
            }
            let den = 2 * a;
            match best {
                Some((bn, bd)) if !frac_le(num, den, bn, bd) => {}
                _ => best = Some((num, den)),
            }
        }
        let (t_n, t_d) = best?;
        Some(self.reconstruct_hit(t_n, t_d))
    }

    /// Reconstructs the hit point for rational `t = t_n / t_d` and reports
    /// `t` scaled by [`crate::SCALE`], falling back to an unscaled
    /// reconstruction if scaling would overflow.
    fn reconstruct_hit(&self, t_n: i64, t_d: i64) -> (IVec2, i64) {
        let scale = i64::from(crate::constants::SCALE);
        let hit_x;
        let hit_y;
        let t_scaled;
        match t_n.checked_mul(scale) {
            Some(scaled_n) => {
                t_scaled = div_round(scaled_n, t_d);
                hit_x = self.origin.x.wrapping_add(
                    i32::try_from(div_round(i64::from(self.direction.x) * t_n, t_d)).unwrap_or(0),
                );
                hit_y = self.origin.y.wrapping_add(
                    i32::try_from(div_round(i64::from(self.direction.y) * t_n, t_d)).unwrap_or(0),
                );
            }
            None => {
                // Precision-preserving fallback: reconstruct directly from
                // the unscaled rational t via i128, never forming the
                // overflowing t*SCALE intermediate.
                let t_n128 = i128::from(t_n);
                let t_d128 = i128::from(t_d);
                let scale128 = i128::from(scale);
                let scaled = t_n128 * scale128 / t_d128;
                t_scaled = scaled.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
                let dx = (i128::from(self.direction.x) * t_n128) / t_d128;
                let dy = (i128::from(self.direction.y) * t_n128) / t_d128;
                hit_x = self.origin.x.wrapping_add(
                    i32::try_from(dx.clamp(i128::from(i32::MIN), i128::from(i32::MAX))).unwrap_or(0),
                );
                hit_y = self.origin.y.wrapping_add(
                    i32::try_from(dy.clamp(i128::from(i32::MIN), i128::from(i32::MAX))).unwrap_or(0),
                );
            }
        }
        (IVec2::new(hit_x, hit_y), t_scaled)
    }
}

/// Compares two non-negative-denominator fractions `n1/d1 <= n2/d2` via
/// cross-multiplication, avoiding floating point division.
fn frac_le(n1: i64, d1: i64, n2: i64, d2: i64) -> bool {
    debug_assert!(d1 > 0 && d2 > 0);
    let lhs = i128::from(n1) * i128::from(d2);
    let rhs = i128::from(n2) * i128::from(d1);
    lhs <= rhs
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn aabb_intersects_is_inclusive_of_touching_edges() {
        let a = IAabb2::from_corners(IVec2::new(0, 0), IVec2::new(10, 10));
        let b = IAabb2::from_corners(IVec2::new(10, 0), IVec2::new(20, 10));
        assert!(a.intersects(&b));
    }

    #[test]
    fn aabb_area_is_i64() {
        let a = IAabb2::from_corners(IVec2::new(0, 0), IVec2::new(100_000, 100_000));
        assert_eq!(a.area(), 10_000_000_000);
    }

    #[test]
    fn circle_circle_intersects() {
        let a = ICircle::new(IVec2::new(0, 0), 5000);
        let b = ICircle::new(IVec2::new(9000, 0), 5000);
        assert!(a.intersects(&b));
        let c = ICircle::new(IVec2::new(20000, 0), 5000);
        assert!(!a.intersects(&c));
    }

    #[test]
    fn circle_bounding_aabb_matches_center_and_radius() {
        let c = ICircle::new(IVec2::new(100, 100), 50);
        let bb = c.bounding_aabb();
        assert_eq!(bb.min, IVec2::new(50, 50));
        assert_eq!(bb.max, IVec2::new(150, 150));
    }

    #[test]
    fn segment_closest_point_clamps_to_endpoints() {
        let seg = ILineSegment::new(IVec2::new(0, 0), IVec2::new(10, 0));
        assert_eq!(seg.closest_point(IVec2::new(-5, 3)), IVec2::new(0, 0));
        assert_eq!(seg.closest_point(IVec2::new(15, -3)), IVec2::new(10, 0));
        assert_eq!(seg.closest_point(IVec2::new(5, 5)), IVec2::new(5, 0));
    }

    #[test]
    fn segment_segment_crossing_intersects() {
        let a = ILineSegment::new(IVec2::new(0, 0), IVec2::new(10, 10));
        let b = ILineSegment::new(IVec2::new(0, 10), IVec2::new(10, 0));
        assert!(a.intersects(&b));
        let c = ILineSegment::new(IVec2::new(0, 20), IVec2::new(10, 30));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn ray_hits_aabb_from_outside() {
        let ray = IRay::new(IVec2::new(-10, 0), IVec2::new(1, 0));
        let aabb = IAabb2::from_corners(IVec2::new(0, -5), IVec2::new(5, 5));
        let hit = ray.intersects_aabb(&aabb);
        assert!(hit.is_some());
        let (point, t) = hit.expect("intersection");
        assert_eq!(point, IVec2::new(0, 0));
        assert_eq!(t, 10 * i64::from(crate::constants::SCALE));
    }

    #[test]
    fn ray_misses_aabb_behind_origin() {
        let ray = IRay::new(IVec2::new(10, 0), IVec2::new(1, 0));
        let aabb = IAabb2::from_corners(IVec2::new(-5, -5), IVec2::new(0, 5));
        assert!(ray.intersects_aabb(&aabb).is_none());
    }

    #[test]
    fn ray_hits_circle() {
        let ray = IRay::new(IVec2::new(-10, 0), IVec2::new(1, 0));
        let circle = ICircle::new(IVec2::new(0, 0), 2000);
        let hit = ray.intersects_circle(&circle);
        assert!(hit.is_some());
    }
}
