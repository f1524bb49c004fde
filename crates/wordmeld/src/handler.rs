//! Per-connection handler: intent decode, dispatch, and the outbound
//! event pump.
//!
//! Each accepted connection gets its own task running this handler. The
//! connection id doubles as the player id for its whole lifetime — there
//! is no handshake and no account; closing the socket IS leaving.
//!
//! Events reach the socket through an unbounded channel: room actors push
//! into it (broadcasts), and this handler pushes into it (caller-only
//! errors). A pump task drains it in order, so a client always observes
//! events in the order the server produced them.

use std::sync::Arc;

use tokio::sync::mpsc;
use wordmeld_protocol::{ClientIntent, Codec, PlayerId, ServerEvent};
use wordmeld_room::PlayerSender;
use wordmeld_transport::{Connection, WebSocketConnection};

use crate::WordmeldError;
use crate::server::ServerState;

/// Drop guard that removes the player from their room when the handler
/// exits — including on panic. `Drop` is synchronous, so the async
/// cleanup runs in a fire-and-forget task.
struct DisconnectGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Some(room) = state.manager.lock().await.leave(player_id).await {
                tracing::debug!(%player_id, %room, "disconnected player removed from room");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), WordmeldError> {
    let player_id = PlayerId(conn.id().into_inner());
    tracing::debug!(%player_id, "player connected");

    let conn = Arc::new(conn);
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let pump = tokio::spawn(pump_events(
        Arc::clone(&conn),
        Arc::clone(&state),
        player_id,
        events_rx,
    ));
    let _guard = DisconnectGuard {
        player_id,
        state: Arc::clone(&state),
    };

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let intent: ClientIntent = match state.codec.decode(&data) {
            Ok(intent) => intent,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "undecodable intent, ignoring");
                continue;
            }
        };

        handle_intent(&state, player_id, &events_tx, intent).await;
    }

    pump.abort();
    // _guard drops here → the player leaves their room.
    Ok(())
}

/// Dispatches one intent to the registries. Failures are advisory: the
/// caller gets an `error` event on their own channel and nothing else
/// changes — a rejected intent never partially applies.
async fn handle_intent<C: Codec>(
    state: &Arc<ServerState<C>>,
    player_id: PlayerId,
    events: &PlayerSender,
    intent: ClientIntent,
) {
    let result = match intent {
        ClientIntent::CreateRoom { nickname } => state
            .manager
            .lock()
            .await
            .create_room(player_id, &nickname, events.clone())
            .await
            .map(|_| ()),

        ClientIntent::JoinRoom { room_id, nickname } => state
            .manager
            .lock()
            .await
            .join_room(player_id, &room_id, &nickname, events.clone())
            .await
            .map(|_| ()),

        ClientIntent::StartGame => state.manager.lock().await.start_game(player_id).await,

        ClientIntent::SubmitWord { word } => {
            state.manager.lock().await.submit_word(player_id, &word).await
        }

        ClientIntent::LeaveRoom => {
            let _ = state.manager.lock().await.leave(player_id).await;
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::debug!(%player_id, error = %e, "intent rejected");
        let _ = events.send(ServerEvent::Error {
            message: e.to_string(),
        });
    }
}

/// Forwards queued events to the socket, in order, until the channel or
/// the connection goes away.
async fn pump_events<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    player_id: PlayerId,
    mut events: mpsc::UnboundedReceiver<ServerEvent>,
) {
    while let Some(event) = events.recv().await {
        let bytes = match state.codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%player_id, error = %e, "failed to encode event");
                continue;
            }
        };
        if conn.send(&bytes).await.is_err() {
            tracing::debug!(%player_id, "outbound pump stopped, connection gone");
            break;
        }
    }
}
