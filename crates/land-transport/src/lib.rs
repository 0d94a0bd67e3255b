// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session lifecycle, per-player dirty tracking, and the parallel encoding
//! controller that sits between a [`land_keeper::LandKeeperHandle`] and a
//! concrete wire transport.
//!
//! This crate never opens a socket itself — [`session::SessionSink`] is the
//! seam a transport binding (WebSocket, Unix socket, in-process channel)
//! implements; [`adapter::TransportAdapter`] only ever calls it.

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

mod adapter;
mod auth;
mod batch;
mod dirty_view;
mod error;
mod session;

pub use adapter::TransportAdapter;
pub use auth::{AuthInfoResolver, AuthenticatedInfo, BoxFuture};
pub use batch::{BatchPlan, ParallelConfig};
pub use error::TransportError;
pub use session::{Session, SessionSink, SessionState};
