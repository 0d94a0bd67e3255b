// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-connection Unix-socket wiring: a length-prefixed framing, a writer
//! task draining a per-connection outbound channel, and a reader loop
//! dispatching [`ControlMessage`]s into a [`TransportAdapter`] and
//! [`LandKeeperHandle`].
//!
//! Grounded on `echo-session-service/src/main.rs`'s `handle_client`: split
//! the stream, spawn a writer task that drains an `mpsc::Receiver<Vec<u8>>`,
//! read length-prefixed frames off the other half in a loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use land_codec::Encoder;
use land_keeper::{ActionEnvelope, ClientId, LandKeeperHandle, PlayerId, SessionId};
use land_state::SnapshotValue;
use land_transport::{BoxFuture, SessionSink, TransportAdapter, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::control::{self, ControlMessage};

const MAX_FRAME: usize = 1 << 20;
const OUTBOUND_DEPTH: usize = 256;

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(0);

/// Writes length-prefixed frames to a per-connection outbound channel;
/// implements [`SessionSink`] so [`TransportAdapter`] can send `stateUpdate`
/// frames down the same pipe as control-plane replies.
struct UnixSessionSink {
    tx: mpsc::Sender<Vec<u8>>,
}

impl SessionSink for UnixSessionSink {
    fn send(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<(), TransportError>> {
        Box::pin(async move {
            // A full channel means the session's outbound queue is over its
            // depth cap; treat it the same as a closed session so the
            // adapter marks it `stale` (`spec.md` §5 backpressure) rather
            // than blocking the keeper's flush on a slow reader.
            self.tx.try_send(bytes).map_err(|_| TransportError::SessionClosed)
        })
    }
}

async fn write_frame(writer: &mut (impl AsyncWriteExt + Unpin), frame: &[u8]) -> std::io::Result<()> {
    let len = u32::try_from(frame.len()).unwrap_or(u32::MAX);
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(frame).await
}

/// Drives one accepted connection end to end: registers it with `adapter`,
/// dispatches control-plane frames against `adapter`/`keeper`, and cleans up
/// on EOF or error.
///
/// # Errors
/// Returns an `anyhow::Error` on an unrecoverable I/O failure; a clean
/// disconnect is not an error and returns `Ok(())`.
pub async fn handle_connection<E>(
    stream: UnixStream,
    adapter: Arc<TransportAdapter<E>>,
    keeper: LandKeeperHandle,
) -> anyhow::Result<()>
where
    E: Encoder + Send + Sync + 'static,
{
    let conn_id = NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed);
    let session = SessionId(format!("conn-{conn_id}"));
    let client = ClientId(format!("conn-{conn_id}"));

    let (mut reader, mut writer) = tokio::io::split(stream);
    let (tx, mut rx) = mpsc::channel::<Vec<u8>>(OUTBOUND_DEPTH);

    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if write_frame(&mut writer, &frame).await.is_err() {
                break;
            }
        }
    });

    adapter
        .on_connect(session.clone(), client.clone(), Arc::new(UnixSessionSink { tx: tx.clone() }))
        .await;

    let mut bound_player: Option<PlayerId> = None;
    let mut read_buf = vec![0_u8; 16 * 1024];
    let mut acc: Vec<u8> = Vec::with_capacity(32 * 1024);

    loop {
        let n = reader.read(&mut read_buf).await?;
        if n == 0 {
            break;
        }
        acc.extend_from_slice(&read_buf[..n]);

        while let Some(frame) = take_frame(&mut acc)? {
            let Ok(msg) = control::decode(&frame) else {
                warn!(conn_id, "dropping connection: malformed control frame");
                acc.clear();
                break;
            };
            dispatch(msg, &session, &client, &adapter, &keeper, &tx, &mut bound_player).await;
        }
    }

    info!(conn_id, "connection closed");
    adapter.on_disconnect(session);
    Ok(())
}

/// Pulls one length-prefixed frame out of `acc`, if a complete one is
/// buffered. Returns an error if the declared length exceeds [`MAX_FRAME`].
fn take_frame(acc: &mut Vec<u8>) -> anyhow::Result<Option<Vec<u8>>> {
    if acc.len() < 4 {
        return Ok(None);
    }
    let len = u32::from_be_bytes([acc[0], acc[1], acc[2], acc[3]]) as usize;
    anyhow::ensure!(len <= MAX_FRAME, "frame of {len} bytes exceeds {MAX_FRAME}-byte cap");
    if acc.len() < 4 + len {
        return Ok(None);
    }
    let frame: Vec<u8> = acc.drain(..4 + len).skip(4).collect();
    Ok(Some(frame))
}

#[allow(clippy::too_many_arguments)]
async fn dispatch<E>(
    msg: ControlMessage,
    session: &SessionId,
    client: &ClientId,
    adapter: &Arc<TransportAdapter<E>>,
    keeper: &LandKeeperHandle,
    tx: &mpsc::Sender<Vec<u8>>,
    bound_player: &mut Option<PlayerId>,
) where
    E: Encoder + Send + Sync + 'static,
{
    match msg {
        ControlMessage::Join { request_id, player_id } => {
            let reply = match adapter.perform_join(session, &player_id, "").await {
                Ok(player) => {
                    *bound_player = Some(player);
                    ControlMessage::JoinResponse { request_id, accepted: true, reason: None }
                }
                Err(err) => ControlMessage::JoinResponse { request_id, accepted: false, reason: Some(err.to_string()) },
            };
            send_control(tx, &reply).await;
        }
        ControlMessage::Leave { request_id: _ } => {
            // Treated as a disconnect trigger: the keeper `on_leave`s this
            // player once the usual grace window elapses
            // (`land-transport`'s `TransportAdapter` has no distinct
            // eager-leave path; see this crate's `DESIGN.md` entry).
            adapter.on_disconnect(session.clone());
            *bound_player = None;
        }
        ControlMessage::Action { request_id, type_identifier, payload } => {
            let Some(player) = bound_player.clone() else {
                send_control(
                    tx,
                    &ControlMessage::ActionResponse { request_id, result: None, error: Some("unauthorized".to_string()) },
                )
                .await;
                return;
            };
            let action = ActionEnvelope { request_id, type_identifier, payload: SnapshotValue::from(&payload) };
            let reply = match keeper.handle_action(player, client.clone(), session.clone(), action).await {
                Ok(outcome) => ControlMessage::ActionResponse {
                    request_id,
                    result: Some((&outcome.result).into()),
                    error: None,
                },
                Err(err) => ControlMessage::ActionResponse { request_id, result: None, error: Some(err.to_string()) },
            };
            send_control(tx, &reply).await;
        }
        ControlMessage::JoinResponse { .. } | ControlMessage::ActionResponse { .. } => {
            // Server-originated kinds; a client sending one is ignored.
        }
    }
}

async fn send_control(tx: &mpsc::Sender<Vec<u8>>, msg: &ControlMessage) {
    match control::encode(msg) {
        Ok(bytes) => {
            let _ = tx.try_send(bytes);
        }
        Err(err) => warn!(?err, "failed to encode control reply"),
    }
}
