//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use hiroba_shared::time::{Clock, SystemClock};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{
        CryptoError, MessageCipher, MessagePusher, NewRoom, RoomId, RoomName, ValueObjectError,
    },
    infrastructure::{
        crypto::{ChaChaCipher, build_key_ring},
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryConnectionRegistry, InMemoryDirectMessageRepository, InMemoryRoomRepository,
            RoomStoreSettings,
        },
    },
    usecase::{
        ConnectParticipantUseCase, CreateRoomUseCase, DeleteRoomUseCase,
        DisconnectParticipantUseCase, GetConversationUseCase, GetRoomDetailUseCase,
        GetRoomMembersUseCase, GetRoomsUseCase, GetStatsUseCase, InviteToRoomUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, PrivateMessageUseCase, RoomRelocator, RoomSequencer,
        SendMessageUseCase, SetUsernameUseCase,
    },
};

use super::{
    handler::{get_room_detail, get_rooms, get_stats, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Errors raised while assembling the server from its configuration
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid default room '{name}': {source}")]
    InvalidDefaultRoom {
        name: String,
        source: ValueObjectError,
    },

    #[error("invalid room in room secret '{room}': {source}")]
    InvalidRoomSecret {
        room: String,
        source: ValueObjectError,
    },

    #[error("failed to derive encryption keys: {0}")]
    KeyDerivation(#[from] CryptoError),
}

/// WebSocket chat server
///
/// # Example
///
/// ```ignore
/// let server = Server::from_config(&ServerConfig::default())?;
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a server from already assembled use cases
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Wire the in-memory stores, the WebSocket pusher and every use case
    pub fn from_config(config: &ServerConfig) -> Result<Self, StartupError> {
        let limits = config.limits;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        // 1. Keys
        let mut room_secrets = Vec::with_capacity(config.room_secrets.len());
        for (room, secret) in &config.room_secrets {
            let room_id = RoomId::new(room).map_err(|source| StartupError::InvalidRoomSecret {
                room: room.clone(),
                source,
            })?;
            room_secrets.push((room_id, secret.clone()));
        }
        let keys = Arc::new(build_key_ring(
            config.encryption_secret.as_deref(),
            &room_secrets,
        )?);
        let cipher: Arc<dyn MessageCipher> = Arc::new(ChaChaCipher::new());

        // 2. Stores
        let invalid_default = |source| StartupError::InvalidDefaultRoom {
            name: config.default_room.clone(),
            source,
        };
        let default_room = NewRoom {
            id: RoomId::from_name(&config.default_room, limits.max_room_name_length)
                .map_err(invalid_default)?,
            name: RoomName::parse(&config.default_room, limits.max_room_name_length)
                .map_err(invalid_default)?,
            description: "Default room for all users".to_string(),
            is_private: false,
            created_by: None,
            max_members: config.default_room_max_members,
        };
        tracing::info!(room = %default_room.id, "default room created");

        let registry = Arc::new(InMemoryConnectionRegistry::new(limits.max_username_length));
        let rooms = Arc::new(InMemoryRoomRepository::new(
            default_room,
            RoomStoreSettings {
                history_capacity: config.history_capacity,
                private_room_policy: config.private_room_policy,
            },
            clock.clone(),
        ));
        let direct_messages = Arc::new(InMemoryDirectMessageRepository::default());

        // 3. MessagePusher
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());

        // 4. UseCases
        let sequencer = Arc::new(RoomSequencer::new());
        let relocator = Arc::new(RoomRelocator::new(
            registry.clone(),
            rooms.clone(),
            message_pusher.clone(),
            sequencer.clone(),
        ));

        let state = AppState {
            message_pusher: message_pusher.clone(),
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                registry.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                registry.clone(),
                rooms.clone(),
                message_pusher.clone(),
                sequencer.clone(),
            )),
            set_username_usecase: Arc::new(SetUsernameUseCase::new(
                registry.clone(),
                rooms.clone(),
                message_pusher.clone(),
                relocator.clone(),
                sequencer.clone(),
            )),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                registry.clone(),
                rooms.clone(),
                message_pusher.clone(),
                limits,
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(registry.clone(), relocator.clone())),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                registry.clone(),
                rooms.clone(),
                message_pusher.clone(),
                relocator,
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                registry.clone(),
                rooms.clone(),
                message_pusher.clone(),
                cipher.clone(),
                keys.clone(),
                sequencer.clone(),
                clock.clone(),
                limits.max_message_length,
            )),
            private_message_usecase: Arc::new(PrivateMessageUseCase::new(
                registry.clone(),
                direct_messages.clone(),
                message_pusher.clone(),
                cipher.clone(),
                keys.clone(),
                clock,
                limits,
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(
                registry.clone(),
                rooms.clone(),
                message_pusher.clone(),
            )),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(rooms.clone())),
            get_room_members_usecase: Arc::new(GetRoomMembersUseCase::new(
                registry.clone(),
                rooms.clone(),
                message_pusher.clone(),
            )),
            get_conversation_usecase: Arc::new(GetConversationUseCase::new(
                registry.clone(),
                direct_messages,
                message_pusher.clone(),
                cipher,
                keys,
                limits.max_username_length,
            )),
            invite_to_room_usecase: Arc::new(InviteToRoomUseCase::new(
                registry.clone(),
                rooms.clone(),
                message_pusher.clone(),
                limits.max_username_length,
            )),
            delete_room_usecase: Arc::new(DeleteRoomUseCase::new(
                registry.clone(),
                rooms.clone(),
                message_pusher.clone(),
                sequencer,
            )),
            get_stats_usecase: Arc::new(GetStatsUseCase::new(registry, rooms, message_pusher)),
        };

        Ok(Self::new(state))
    }

    /// Routes of the server
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .route("/api/stats", get(get_stats))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the WebSocket chat server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Connect to: ws://{}/ws", bind_addr);

        self.serve(listener).await?;
        Ok(())
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        tracing::info!(
            "WebSocket chat server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
