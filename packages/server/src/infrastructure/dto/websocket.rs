//! WebSocket message DTOs.
//!
//! Every frame is a JSON object internally tagged by `"type"`.

use serde::{Deserialize, Serialize};

/// Command sent by a client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    SetUsername {
        name: String,
    },
    CreateRoom {
        /// Falls back to `name` when omitted
        #[serde(default)]
        room_id: Option<String>,
        /// Falls back to `room_id` when omitted
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        description: String,
        #[serde(default)]
        is_private: bool,
        #[serde(default)]
        max_members: Option<usize>,
    },
    JoinRoom {
        room_id: String,
    },
    LeaveRoom {
        room_id: String,
    },
    Message {
        content: String,
        /// Defaults to the sender's current room
        #[serde(default)]
        room: Option<String>,
        #[serde(default)]
        encrypt: bool,
    },
    PrivateMessage {
        receiver: String,
        message: String,
        #[serde(default = "default_private_encrypt")]
        encrypt: bool,
    },
    GetRooms,
    GetConversation {
        with_user: String,
    },
    GetRoomMembers {
        room_id: String,
    },
    InviteToRoom {
        room_id: String,
        username: String,
    },
    DeleteRoom {
        room_id: String,
    },
    GetStats,
}

fn default_private_encrypt() -> bool {
    true
}

/// Room message as seen by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub sender: String,
    pub content: String,
    /// Unix timestamp (milliseconds)
    pub timestamp: i64,
    pub encrypted: bool,
    pub room: String,
}

/// Private message as seen by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectMessageDto {
    pub sender: String,
    pub receiver: String,
    pub content: String,
    /// Unix timestamp (milliseconds)
    pub timestamp: i64,
    pub encrypted: bool,
}

/// Room as seen by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_private: bool,
    pub member_count: usize,
    pub max_members: usize,
    /// Unix timestamp (milliseconds)
    pub created_at: i64,
}

/// Event pushed to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    UsernameSet {
        username: String,
    },
    ReceiveMessage(ChatMessageDto),
    UpdateUserList {
        usernames: Vec<String>,
    },
    RoomList {
        rooms: Vec<RoomInfo>,
    },
    RoomCreated {
        room: RoomInfo,
    },
    RoomDeleted {
        room: String,
    },
    JoinedRoom {
        room: RoomInfo,
        history: Vec<ChatMessageDto>,
    },
    LeftRoom {
        room: String,
    },
    UserJoinedRoom {
        username: String,
        room: String,
    },
    UserLeftRoom {
        username: String,
        room: String,
    },
    PrivateMessage(DirectMessageDto),
    PrivateMessageSent(DirectMessageDto),
    ConversationHistory {
        with_user: String,
        messages: Vec<DirectMessageDto>,
    },
    RoomMembers {
        room: String,
        members: Vec<String>,
    },
    RoomInvitation {
        room: String,
        invited_by: String,
    },
    Stats {
        users_online: usize,
        connections: usize,
        rooms: usize,
    },
    Error {
        message: String,
    },
}
