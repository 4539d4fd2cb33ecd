//! WebSocket handler bridging connections to game session actors.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws/{game_id}?username=NAME`
//! 2. Server upgrades and asks the game's session actor to join the player
//! 3. Two tasks run until disconnect:
//!    - Send task: drains the player's event channel onto the socket
//!    - Receive loop: parses client commands and forwards them to the actor
//! 4. On disconnect, the actor marks the player out
//!
//! A rejected join (full lobby, game already begun) closes the socket with
//! application close code 4001 and the rejection reason.

use axum::{
    extract::{
        Path, Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};

use clue_less::{
    ClientCommand, ServerEvent,
    entities::{GameId, Username},
    session::{ConnectionId, SessionMessage},
};

use super::AppState;

/// Close code for a join the game rules rejected.
const CLOSE_JOIN_REJECTED: u16 = 4001;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    username: Option<String>,
}

/// Upgrade an HTTP connection to a game WebSocket.
///
/// Requires a non-blank `username` query parameter; identity is assumed to
/// be authenticated upstream. Responds `401 Unauthorized` without it.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(game_id): Path<GameId>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let Some(username) = query_username(query.username.as_deref()) else {
        return (StatusCode::UNAUTHORIZED, "Missing username").into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, game_id, username, state))
}

/// A normalized username from the query string, or `None` when the
/// parameter is missing or blank.
fn query_username(raw: Option<&str>) -> Option<Username> {
    let username = Username::new(raw.unwrap_or(""));
    (!username.is_empty()).then_some(username)
}

/// Handle an established WebSocket connection for one player.
async fn handle_socket(socket: WebSocket, game_id: GameId, username: Username, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let connection = ConnectionId::new();

    info!("WebSocket connected: game={game_id}, user={username}");

    let session = state.session_manager.get_or_create(game_id).await;
    let (event_tx, mut event_rx) = mpsc::channel::<ServerEvent>(64);

    // Join the game before serving any traffic.
    let (response, ack) = oneshot::channel();
    let sent = session
        .send(SessionMessage::Connect {
            username: username.clone(),
            connection,
            sender: event_tx.clone(),
            response,
        })
        .await;
    let rejection = match (sent, ack.await) {
        (Ok(()), Ok(Ok(()))) => None,
        (Ok(()), Ok(Err(e))) => Some(e.to_string()),
        _ => Some("Session is closed".to_string()),
    };
    if let Some(reason) = rejection {
        warn!("game {game_id}: join rejected for {username}: {reason}");
        let _ = sender
            .send(Message::Close(Some(CloseFrame {
                code: CLOSE_JOIN_REJECTED,
                reason: reason.into(),
            })))
            .await;
        return;
    }

    // Send task: drain the event channel onto the socket.
    let send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    warn!("failed to serialize event: {e}");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Receive loop: parse and forward client commands.
    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientCommand>(&text) {
                Ok(command) => {
                    if session
                        .send(SessionMessage::Command {
                            username: username.clone(),
                            command,
                        })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    debug!("game {game_id}: unparseable frame from {username}: {e}");
                    let _ = event_tx
                        .send(ServerEvent::Error {
                            message: "Invalid message format".to_string(),
                        })
                        .await;
                }
            },
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    info!("WebSocket disconnected: game={game_id}, user={username}");
    let _ = session
        .send(SessionMessage::Disconnect {
            username,
            connection,
        })
        .await;
    send_task.abort();
}
