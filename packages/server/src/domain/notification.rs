//! Events pushed from the server to connections.
//!
//! Use cases produce `Notification`s; the transport decides how they are
//! encoded on the wire.

use super::{
    entity::{ChatMessage, DirectMessage, RoomSummary},
    value_object::{RoomId, Username},
};

/// Server-wide counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerStats {
    /// Connections that claimed a username
    pub users_online: usize,
    /// All live connections, identified or not
    pub connections: usize,
    pub rooms: usize,
}

/// An event delivered to one or more connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    UsernameSet {
        username: Username,
    },
    ReceiveMessage(ChatMessage),
    UpdateUserList(Vec<Username>),
    RoomList(Vec<RoomSummary>),
    RoomCreated(RoomSummary),
    RoomDeleted {
        room: RoomId,
    },
    JoinedRoom {
        room: RoomSummary,
        history: Vec<ChatMessage>,
    },
    LeftRoom {
        room: RoomId,
    },
    UserJoinedRoom {
        username: Username,
        room: RoomId,
    },
    UserLeftRoom {
        username: Username,
        room: RoomId,
    },
    /// Delivered to the receiver of a private message
    PrivateMessage(DirectMessage),
    /// Delivery confirmation echoed to the sender of a private message
    PrivateMessageSent(DirectMessage),
    ConversationHistory {
        with_user: String,
        messages: Vec<DirectMessage>,
    },
    RoomMembers {
        room: RoomId,
        members: Vec<Username>,
    },
    RoomInvitation {
        room: RoomId,
        invited_by: Username,
    },
    Stats(ServerStats),
    Error {
        message: String,
    },
}

impl Notification {
    /// Short event name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UsernameSet { .. } => "username_set",
            Self::ReceiveMessage(_) => "receive_message",
            Self::UpdateUserList(_) => "update_user_list",
            Self::RoomList(_) => "room_list",
            Self::RoomCreated(_) => "room_created",
            Self::RoomDeleted { .. } => "room_deleted",
            Self::JoinedRoom { .. } => "joined_room",
            Self::LeftRoom { .. } => "left_room",
            Self::UserJoinedRoom { .. } => "user_joined_room",
            Self::UserLeftRoom { .. } => "user_left_room",
            Self::PrivateMessage(_) => "private_message",
            Self::PrivateMessageSent(_) => "private_message_sent",
            Self::ConversationHistory { .. } => "conversation_history",
            Self::RoomMembers { .. } => "room_members",
            Self::RoomInvitation { .. } => "room_invitation",
            Self::Stats(_) => "stats",
            Self::Error { .. } => "error",
        }
    }
}
