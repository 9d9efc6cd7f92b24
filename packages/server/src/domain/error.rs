//! Domain error types.

use thiserror::Error;

/// Errors raised while constructing value objects from raw input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username must be at most {max} characters")]
    UsernameTooLong { max: usize },

    #[error("username '{0}' is reserved")]
    ReservedUsername(String),

    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("room name must not be empty")]
    EmptyRoomName,

    #[error("room name must be at most {max} characters")]
    RoomNameTooLong { max: usize },

    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("message exceeds maximum length of {max} characters")]
    MessageTooLong { max: usize },
}

/// Connection Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Another live connection already holds the name
    #[error("username '{0}' is already taken")]
    NameTaken(String),

    #[error("invalid username: {0}")]
    InvalidName(#[from] ValueObjectError),

    /// The connection already claimed a name (usernames are immutable)
    #[error("username already set to '{0}'")]
    AlreadyIdentified(String),

    #[error("connection is not registered")]
    ConnectionNotFound,
}

/// Room Store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room '{0}' already exists")]
    RoomExists(String),

    #[error("room '{0}' does not exist")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("room '{0}' is full")]
    RoomFull(String),

    #[error("room '{0}' still has members")]
    RoomNotEmpty(String),
}

/// Encryption Boundary errors
///
/// Messages never include key material or ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("failed to encrypt message: {0}")]
    Encryption(String),

    #[error("failed to decrypt message: ciphertext is corrupted or was encrypted with another key")]
    Decryption,
}

/// Errors raised by a `MessagePusher`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to serialize notification: {0}")]
    Serialization(String),
}
