//! UseCase 層のエラー定義
//!
//! ドメイン層の各エラーを、クライアントへ返す 1 つのエラー型にまとめます。
//! `Display` の文字列がそのまま `error{message}` イベントの本文になります。

use thiserror::Error;

use crate::domain::{CryptoError, MessagePushError, RegistryError, RoomError, ValueObjectError};

/// コマンド処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("invalid username: {0}")]
    InvalidName(String),

    #[error("username '{0}' is already taken")]
    NameTaken(String),

    #[error("username already set to '{0}'")]
    AlreadyIdentified(String),

    #[error("set a username first")]
    NotIdentified,

    #[error("invalid room name: {0}")]
    InvalidRoomName(String),

    #[error("room '{0}' does not exist")]
    NotFound(String),

    #[error("room '{0}' already exists")]
    RoomExists(String),

    #[error("room '{0}' is full")]
    RoomFull(String),

    #[error("room '{0}' still has members")]
    RoomNotEmpty(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidMessage(String),

    #[error("user '{0}' is not online")]
    UserNotFound(String),

    #[error("failed to encrypt message")]
    EncryptionFailed,

    #[error("failed to decrypt message")]
    DecryptionFailed,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValueObjectError> for ChatError {
    fn from(e: ValueObjectError) -> Self {
        match e {
            ValueObjectError::EmptyUsername
            | ValueObjectError::UsernameTooLong { .. }
            | ValueObjectError::ReservedUsername(_) => Self::InvalidName(e.to_string()),
            ValueObjectError::EmptyRoomId
            | ValueObjectError::EmptyRoomName
            | ValueObjectError::RoomNameTooLong { .. } => Self::InvalidRoomName(e.to_string()),
            ValueObjectError::EmptyMessage | ValueObjectError::MessageTooLong { .. } => {
                Self::InvalidMessage(e.to_string())
            }
        }
    }
}

impl From<RegistryError> for ChatError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NameTaken(name) => Self::NameTaken(name),
            RegistryError::InvalidName(inner) => inner.into(),
            RegistryError::AlreadyIdentified(name) => Self::AlreadyIdentified(name),
            RegistryError::ConnectionNotFound => Self::Internal(e.to_string()),
        }
    }
}

impl From<RoomError> for ChatError {
    fn from(e: RoomError) -> Self {
        match e {
            RoomError::RoomExists(id) => Self::RoomExists(id),
            RoomError::NotFound(id) => Self::NotFound(id),
            RoomError::Forbidden(reason) => Self::Forbidden(reason),
            RoomError::RoomFull(name) => Self::RoomFull(name),
            RoomError::RoomNotEmpty(id) => Self::RoomNotEmpty(id),
        }
    }
}

impl From<CryptoError> for ChatError {
    // 鍵や暗号文の詳細はクライアントへ返さない
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::Encryption(_) => Self::EncryptionFailed,
            CryptoError::Decryption => Self::DecryptionFailed,
        }
    }
}

impl From<MessagePushError> for ChatError {
    fn from(e: MessagePushError) -> Self {
        Self::Internal(e.to_string())
    }
}
