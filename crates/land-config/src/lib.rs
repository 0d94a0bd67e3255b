// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `LandConfig`: the core configuration keys from `spec.md` §6, a storage
//! port ([`ConfigStore`]), and a filesystem adapter ([`FsConfigStore`]).

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Core configuration keys (`spec.md` §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandConfig {
    /// Tick loop period, milliseconds.
    pub tick_period_ms: u64,
    /// Sync flush period, milliseconds.
    pub sync_period_ms: u64,
    /// Which of the four encoders to use for state updates.
    pub encoding: EncodingKind,
    /// Whether the parallel encoding controller is enabled.
    pub parallel_encoding: bool,
    /// Player count below which encoding runs serially.
    pub parallel_min_players: usize,
    /// Batch size for the parallel encoding controller.
    pub parallel_batch_size: usize,
    /// Bounded task concurrency below `parallel_high_threshold`.
    pub parallel_low_cap: usize,
    /// Bounded task concurrency at or above `parallel_high_threshold`.
    pub parallel_high_cap: usize,
    /// Player count at which `parallel_high_cap` replaces `parallel_low_cap`.
    pub parallel_high_threshold: usize,
    /// Grace window after disconnect before a player is leaved, milliseconds.
    pub join_grace_ms: u64,
    /// Default keeper command deadline, milliseconds.
    pub command_timeout_ms: u64,
    /// Outbound queue byte threshold before a session is marked `stale`.
    pub outbound_queue_bytes_max: u64,
}

/// Which state-update encoder a land is configured to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EncodingKind {
    /// `jsonObject`.
    JsonObject,
    /// `opcodeJsonArrayLegacy`.
    OpcodeJsonArrayLegacy,
    /// `opcodeJsonArray`.
    OpcodeJsonArray,
    /// `opcodeMessagePack`.
    OpcodeMessagePack,
}

impl Default for LandConfig {
    /// `P_tick` defaults to 50ms per `spec.md` §4.E's example; `command_timeout_ms`
    /// defaults to `2 * tick_period_ms` per §5's "default: 2×`P_tick`".
    fn default() -> Self {
        const TICK_PERIOD_MS: u64 = 50;
        Self {
            tick_period_ms: TICK_PERIOD_MS,
            sync_period_ms: TICK_PERIOD_MS,
            encoding: EncodingKind::OpcodeMessagePack,
            parallel_encoding: true,
            parallel_min_players: 4,
            parallel_batch_size: 16,
            parallel_low_cap: 2,
            parallel_high_cap: 8,
            parallel_high_threshold: 64,
            join_grace_ms: 5_000,
            command_timeout_ms: TICK_PERIOD_MS * 2,
            outbound_queue_bytes_max: 1 << 20,
        }
    }
}

/// Storage port for raw configuration blobs, keyed by logical name.
pub trait ConfigStore {
    /// Loads a raw config blob. Returns [`ConfigError::NotFound`] if missing.
    ///
    /// # Errors
    /// Returns [`ConfigError`] on any storage failure.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;

    /// Persists a raw config blob.
    ///
    /// # Errors
    /// Returns [`ConfigError`] on any storage failure.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Errors produced while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in the store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The platform config directory could not be resolved.
    #[error("other: {0}")]
    Other(String),
}

/// Loads and saves [`LandConfig`] (or any serializable value) through a
/// [`ConfigStore`], keeping JSON (de)serialization out of the storage port.
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Creates a service backed by `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Consumes the service, returning the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Loads and deserializes a config value for `key`; `Ok(None)` if missing.
    ///
    /// # Errors
    /// Returns [`ConfigError`] on any storage or deserialization failure.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        match self.store.load_raw(key) {
            Ok(bytes) => {
                if bytes.is_empty() {
                    return Ok(None);
                }
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            Err(ConfigError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Serializes and persists a config value for `key`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] on any storage or serialization failure.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }
}

/// Stores configs as JSON files under the platform config directory
/// (e.g., `~/.config/landkeeper` on Linux).
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// Creates a store rooted at the user config directory.
    ///
    /// # Errors
    /// Returns [`ConfigError::Other`] if the platform config directory
    /// cannot be resolved, or [`ConfigError::Io`] if it cannot be created.
    pub fn new() -> Result<Self, ConfigError> {
        let proj = ProjectDirs::from("dev", "flyingrobots", "LandKeeper")
            .ok_or_else(|| ConfigError::Other("could not resolve config dir".into()))?;
        let base = proj.config_dir().to_path_buf();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::NotFound),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }
}
