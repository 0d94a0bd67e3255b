// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The LandKeeper: a single-writer actor owning one land's state tree,
//! dirty tracker, and reevaluation record.
//!
//! Every command — joins, leaves, actions, ticks — runs on one dedicated
//! task in strict FIFO order. There is no lock: exclusivity comes from the
//! actor being the only task that ever touches the land's
//! [`land_state::StateNode`]. Callers talk to it only through a
//! [`LandKeeperHandle`], obtained from [`spawn_keeper`].

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

mod command;
mod config;
mod error;
mod ids;
mod keeper;
mod publish;
mod rules;
mod state_machine;

pub use config::KeeperConfig;
pub use land_reeval::{ReevaluationEntry, RetentionPolicy};
pub use error::LandError;
pub use ids::{ClientId, LandId, PlayerId, SessionId, Tick};
pub use keeper::{spawn_keeper, LandKeeperHandle};
pub use publish::{DirtyPublisher, NullPublisher};
pub use rules::{ActionEnvelope, ActionOutcome, LandServer, RuleContext, RuleEffects, ServerEvent};
pub use state_machine::KeeperState;
