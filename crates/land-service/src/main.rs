// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `land-service`: process wiring for one `LandKeeper` instance — loads
//! [`LandConfig`], spawns the keeper with [`demo_land::DemoLobby`] (or
//! whatever `LandServer` a caller builds against this crate's pieces
//! directly), wires a [`TransportAdapter`] over it, and serves sessions on
//! a Unix domain socket.
//!
//! Grounded on `echo-session-service/src/main.rs`'s `#[tokio::main]` +
//! `tracing_subscriber::fmt::init()` + `ConfigService<FsConfigStore>` +
//! accept-loop shape, and on `warp-cli`'s `clap`-derived argument parsing.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_must_use)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::print_stdout, clippy::print_stderr)]

mod control;
mod demo_land;
mod session_io;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use land_codec::{Encoder, JsonObjectEncoder, MessagePackEncoder, OpcodeJsonEncoder};
use land_config::{ConfigService, EncodingKind, FsConfigStore, LandConfig};
use land_keeper::{spawn_keeper, KeeperConfig, LandId, PlayerId};
use land_state::{PathHashTable, SnapshotValue};
use land_transport::{AuthInfoResolver, AuthenticatedInfo, BoxFuture, ParallelConfig, TransportAdapter, TransportError};
use tokio::net::UnixListener;
use tracing::{info, warn};

/// Serves one `LandKeeper` instance over a Unix domain socket.
#[derive(Parser, Debug)]
#[command(name = "land-service", about = "Serves one LandKeeper instance over a Unix domain socket")]
struct Args {
    /// Land type name; used for logging and the land id only.
    #[arg(long, default_value = "demo-lobby")]
    land_type: String,
    /// Instance id for this land.
    #[arg(long, default_value = "default")]
    instance_id: String,
    /// Unix socket path to listen on. Defaults to a path under the system
    /// temp directory.
    #[arg(long)]
    socket: Option<PathBuf>,
}

/// Accepts every `join` (`spec.md` Non-goals excludes matchmaking and
/// persistent storage, so this binary has no account system to check
/// against); a real deployment supplies its own [`AuthInfoResolver`].
struct OpenAuth;

impl AuthInfoResolver for OpenAuth {
    fn resolve<'a>(&'a self, path: &'a str, _uri: &'a str) -> BoxFuture<'a, Result<Option<AuthenticatedInfo>, TransportError>> {
        Box::pin(async move {
            Ok(Some(AuthenticatedInfo { player_id: PlayerId(path.to_string()), metadata: SnapshotValue::Null }))
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config_service: Option<ConfigService<FsConfigStore>> = FsConfigStore::new().map(ConfigService::new).ok();
    let land_config: LandConfig = config_service
        .as_ref()
        .and_then(|svc| svc.load("land").ok().flatten())
        .unwrap_or_default();
    if let Some(svc) = &config_service {
        let _ = svc.save("land", &land_config);
    }

    let socket_path = args.socket.unwrap_or_else(|| std::env::temp_dir().join("landkeeper.sock"));
    let _ = std::fs::remove_file(&socket_path);

    let land_id = LandId::new(args.land_type, args.instance_id);
    let keeper_config = KeeperConfig {
        tick_period: Duration::from_millis(land_config.tick_period_ms),
        command_timeout: Duration::from_millis(land_config.command_timeout_ms),
        join_grace: Duration::from_millis(land_config.join_grace_ms),
        ..KeeperConfig::default()
    };
    let parallel = ParallelConfig {
        enabled: land_config.parallel_encoding,
        min_parallel_count: land_config.parallel_min_players,
        batch_size: land_config.parallel_batch_size,
        low_cap: land_config.parallel_low_cap,
        high_cap: land_config.parallel_high_cap,
        high_threshold: land_config.parallel_high_threshold,
    };
    let sync_period = Duration::from_millis(land_config.sync_period_ms);
    let join_grace = Duration::from_millis(land_config.join_grace_ms);

    info!(%land_id, socket = %socket_path.display(), encoding = ?land_config.encoding, "starting land-service");

    match land_config.encoding {
        EncodingKind::JsonObject => {
            serve(JsonObjectEncoder, land_id, keeper_config, parallel, sync_period, join_grace, socket_path).await
        }
        EncodingKind::OpcodeJsonArrayLegacy => {
            serve(OpcodeJsonEncoder::legacy(), land_id, keeper_config, parallel, sync_period, join_grace, socket_path).await
        }
        EncodingKind::OpcodeJsonArray => {
            serve(OpcodeJsonEncoder::path_hashed(), land_id, keeper_config, parallel, sync_period, join_grace, socket_path).await
        }
        EncodingKind::OpcodeMessagePack => {
            serve(MessagePackEncoder::path_hashed(), land_id, keeper_config, parallel, sync_period, join_grace, socket_path).await
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn serve<E>(
    encoder: E,
    land_id: LandId,
    keeper_config: KeeperConfig,
    parallel: ParallelConfig,
    sync_period: Duration,
    join_grace: Duration,
    socket_path: PathBuf,
) -> anyhow::Result<()>
where
    E: Encoder + Send + Sync + 'static,
{
    let server = Box::new(demo_land::DemoLobby::new());
    let path_table =
        PathHashTable::build(demo_land::DemoLobby::synced_paths()).context("demo lobby schema has colliding path hashes")?;

    let keeper = spawn_keeper(land_id, server, keeper_config, Arc::new(()), None);
    let adapter = TransportAdapter::new(keeper.clone(), encoder, path_table, Arc::new(OpenAuth), parallel, join_grace);
    keeper
        .set_transport(adapter.clone())
        .await
        .map_err(|err| anyhow::anyhow!("set_transport failed: {err}"))?;

    {
        let adapter = Arc::clone(&adapter);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sync_period);
            loop {
                ticker.tick().await;
                adapter.sync_now().await;
            }
        });
    }

    let listener = UnixListener::bind(&socket_path).with_context(|| format!("binding {}", socket_path.display()))?;
    info!(socket = %socket_path.display(), "listening");

    loop {
        let (stream, _addr) = listener.accept().await.context("accepting connection")?;
        let adapter = Arc::clone(&adapter);
        let keeper = keeper.clone();
        tokio::spawn(async move {
            if let Err(err) = session_io::handle_connection(stream, adapter, keeper).await {
                warn!(?err, "connection handler error");
            }
        });
    }
}
