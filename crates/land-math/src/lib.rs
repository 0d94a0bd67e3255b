// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! land-math: deterministic fixed-point math kernel.
//!
//! Every type and function in this crate must produce bit-identical results
//! across servers, replays, and clients given the same inputs. That rules out
//! platform transcendentals (`f32::sin`, `f64::sqrt`, ...) and any rounding
//! mode that isn't pinned explicitly. See [`quantize`] for the wire contract
//! this crate exists to uphold.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::use_self
)]

mod constants;
/// Collision and bounding-volume primitives (`IAABB2`, `ICircle`, `ILineSegment`, `IRay`).
pub mod geom;
/// Quantization contract: `f32` ⇄ fixed-point `i32` conversion.
pub mod quantize;
/// Deterministic CORDIC `sin`/`cos`/`atan2` and integer `sqrt`.
pub mod trig;
/// Integer 2D/3D vector types with wrapping and saturating arithmetic.
pub mod vec;

pub use constants::{MAX_CIRCLE_RADIUS, SCALE, WORLD_MAX};
pub use geom::{IAabb2, ICircle, ILineSegment, IRay};
pub use quantize::{dequantize, multiply_safe, quantize};
pub use trig::{atan2_degrees, sin_cos_degrees, sqrt_i64};
pub use vec::{IVec2, IVec3};
