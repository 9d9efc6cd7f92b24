//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, Notification},
    infrastructure::dto::websocket::ClientCommand,
    ui::state::AppState,
    usecase::{ChatError, CreateRoomInput},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives frames from the rx channel and writes them to the WebSocket.
///
/// The task ends when the socket is closed or the channel is dropped.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive notifications
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = state.connect_participant_usecase.execute(tx).await;

    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!(%connection_id, "WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => handle_text(&recv_state, &connection_id, text.as_str()).await,
                Message::Close(_) => {
                    tracing::debug!(%connection_id, "client requested close");
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if let Err(e) = state
        .disconnect_participant_usecase
        .execute(&connection_id)
        .await
    {
        tracing::warn!(%connection_id, "Failed to clean up connection: {}", e);
    }
}

/// Parse and run one command. Failures go back to this connection only.
async fn handle_text(state: &AppState, connection_id: &ConnectionId, text: &str) {
    let message = match serde_json::from_str::<ClientCommand>(text) {
        Ok(command) => match dispatch(state, connection_id, command).await {
            Ok(()) => return,
            Err(e) => e.to_string(),
        },
        Err(e) => format!("malformed command: {}", e),
    };

    tracing::warn!(%connection_id, "command rejected: {}", message);
    if let Err(e) = state
        .message_pusher
        .push_to(connection_id, &Notification::Error { message })
        .await
    {
        tracing::debug!(%connection_id, "Failed to report error: {}", e);
    }
}

async fn dispatch(
    state: &AppState,
    connection_id: &ConnectionId,
    command: ClientCommand,
) -> Result<(), ChatError> {
    match command {
        ClientCommand::SetUsername { name } => {
            state
                .set_username_usecase
                .execute(connection_id, &name)
                .await
        }
        ClientCommand::CreateRoom {
            room_id,
            name,
            description,
            is_private,
            max_members,
        } => {
            state
                .create_room_usecase
                .execute(
                    connection_id,
                    CreateRoomInput {
                        room_id,
                        name,
                        description,
                        is_private,
                        max_members,
                    },
                )
                .await
        }
        ClientCommand::JoinRoom { room_id } => {
            state
                .join_room_usecase
                .execute(connection_id, &room_id)
                .await
        }
        ClientCommand::LeaveRoom { room_id } => {
            state
                .leave_room_usecase
                .execute(connection_id, &room_id)
                .await
        }
        ClientCommand::Message {
            content,
            room,
            encrypt,
        } => {
            state
                .send_message_usecase
                .execute(connection_id, &content, room.as_deref(), encrypt)
                .await
        }
        ClientCommand::PrivateMessage {
            receiver,
            message,
            encrypt,
        } => {
            state
                .private_message_usecase
                .execute(connection_id, &receiver, &message, encrypt)
                .await
        }
        ClientCommand::GetRooms => state.get_rooms_usecase.execute(connection_id).await,
        ClientCommand::GetConversation { with_user } => {
            state
                .get_conversation_usecase
                .execute(connection_id, &with_user)
                .await
        }
        ClientCommand::GetRoomMembers { room_id } => {
            state
                .get_room_members_usecase
                .execute(connection_id, &room_id)
                .await
        }
        ClientCommand::InviteToRoom { room_id, username } => {
            state
                .invite_to_room_usecase
                .execute(connection_id, &room_id, &username)
                .await
        }
        ClientCommand::DeleteRoom { room_id } => {
            state
                .delete_room_usecase
                .execute(connection_id, &room_id)
                .await
        }
        ClientCommand::GetStats => state.get_stats_usecase.execute(connection_id).await,
    }
}
