//! Domain layer for the chat server.
//!
//! This module contains the business rules of connections, rooms and
//! messages, independent of the transport, DTOs and storage.

pub mod crypto;
pub mod entity;
pub mod error;
pub mod notification;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use crypto::{EncryptionKey, KeyRing, MessageCipher};
pub use entity::{
    ChatMessage, Departure, DirectMessage, JoinOutcome, NewRoom, PrivateRoomPolicy, Room,
    RoomSummary, Session,
};
pub use error::{CryptoError, MessagePushError, RegistryError, RoomError, ValueObjectError};
pub use notification::{Notification, ServerStats};
pub use pusher::{MessagePusher, PusherChannel};
#[cfg(test)]
pub use pusher::MockMessagePusher;
pub use repository::{ConnectionRegistry, DirectMessageRepository, RoomRepository};
pub use value_object::{
    ConnectionId, MessageContent, RESERVED_USERNAME, RoomId, RoomName, Timestamp, Username,
};
