//! Encryption Boundary: key types and the cipher interface.

use std::{collections::HashMap, fmt};

use super::{error::CryptoError, value_object::RoomId};

/// Raw symmetric key material.
///
/// `Debug` is redacted so keys never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey(Vec<u8>);

impl EncryptionKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

/// Authenticated symmetric encryption of message payloads
pub trait MessageCipher: Send + Sync {
    /// Encrypt `plaintext`.
    ///
    /// Fails with `CryptoError::Encryption` if the key is malformed.
    fn encrypt(&self, plaintext: &str, key: &EncryptionKey) -> Result<String, CryptoError>;

    /// Decrypt `ciphertext`.
    ///
    /// Fails with `CryptoError::Decryption` if the ciphertext was produced with
    /// another key or has been altered.
    fn decrypt(&self, ciphertext: &str, key: &EncryptionKey) -> Result<String, CryptoError>;
}

/// Process-wide keys, fixed at startup
#[derive(Debug, Clone)]
pub struct KeyRing {
    room_default: EncryptionKey,
    rooms: HashMap<RoomId, EncryptionKey>,
    direct: EncryptionKey,
}

impl KeyRing {
    pub fn new(
        room_default: EncryptionKey,
        rooms: HashMap<RoomId, EncryptionKey>,
        direct: EncryptionKey,
    ) -> Self {
        Self {
            room_default,
            rooms,
            direct,
        }
    }

    /// The room's own key if one is configured, otherwise the default room key
    pub fn room_key(&self, room_id: &RoomId) -> &EncryptionKey {
        self.rooms.get(room_id).unwrap_or(&self.room_default)
    }

    /// Key for private messages, independent of every room key
    pub fn direct_key(&self) -> &EncryptionKey {
        &self.direct
    }
}
