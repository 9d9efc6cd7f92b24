//! Key derivation for the process-wide key ring.

use std::collections::HashMap;

use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;

use crate::domain::{CryptoError, EncryptionKey, KeyRing, RoomId};

const SALT: &[u8] = b"hiroba/v1";
const ROOM_DEFAULT_INFO: &str = "hiroba/room-default-key";
const DIRECT_INFO: &str = "hiroba/direct-message-key";
const ROOM_INFO_PREFIX: &str = "hiroba/room-key/";

/// Derive a 32-byte key from `secret` for the purpose named by `info`
pub fn derive_key(secret: &[u8], info: &str) -> Result<EncryptionKey, CryptoError> {
    let hk = Hkdf::<Sha256>::new(Some(SALT), secret);
    let mut okm = [0u8; 32];
    hk.expand(info.as_bytes(), &mut okm)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    Ok(EncryptionKey::new(okm.to_vec()))
}

/// Build the key ring used for the lifetime of the process.
///
/// Without a master secret, a random one is generated; messages encrypted
/// by a previous run can then no longer be decrypted.
pub fn build_key_ring(
    master_secret: Option<&str>,
    room_secrets: &[(RoomId, String)],
) -> Result<KeyRing, CryptoError> {
    let master: Vec<u8> = match master_secret {
        Some(secret) => secret.as_bytes().to_vec(),
        None => {
            let mut bytes = [0u8; 32];
            rand::rng().fill_bytes(&mut bytes);
            tracing::info!("no encryption secret configured, generated an ephemeral one");
            bytes.to_vec()
        }
    };

    let room_default = derive_key(&master, ROOM_DEFAULT_INFO)?;
    let direct = derive_key(&master, DIRECT_INFO)?;

    let mut rooms = HashMap::new();
    for (room_id, secret) in room_secrets {
        let info = format!("{}{}", ROOM_INFO_PREFIX, room_id);
        rooms.insert(room_id.clone(), derive_key(secret.as_bytes(), &info)?);
        tracing::debug!(room = %room_id, "derived dedicated room key");
    }

    Ok(KeyRing::new(room_default, rooms, direct))
}
