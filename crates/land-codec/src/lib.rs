// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! State-update wire codecs: `jsonObject`, `opcodeJsonArrayLegacy`,
//! `opcodeJsonArray`, and `opcodeMessagePack`.
//!
//! All four implement [`Encoder`] and share one `WireEnvelope`/`WireOp`/
//! `WirePath` representation, parameterized by [`PathForm`] where the
//! legacy/path-hash distinction applies.

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

mod encoder;
mod envelope;
mod error;
mod op_wire;
mod path_wire;
mod value_wire;

pub use encoder::{Encoder, JsonObjectEncoder, MessagePackEncoder, OpcodeJsonEncoder};
pub use envelope::WireEnvelope;
pub use error::CodecError;
pub use op_wire::{encode_op, encode_ops, OpCode, WireOp};
pub use path_wire::{encode_path, HashedPath, PathForm, WireKey, WirePath};
pub use value_wire::WireValue;
