//! ChaCha20-Poly1305 message cipher.
//!
//! Wire form: base64(nonce(12) || ciphertext || tag(16)).

use base64::Engine;
use chacha20poly1305::{
    ChaCha20Poly1305, Key, Nonce,
    aead::{Aead, KeyInit},
};
use rand::RngCore;

use crate::domain::{CryptoError, EncryptionKey, MessageCipher};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Debug, Clone, Copy, Default)]
pub struct ChaChaCipher;

impl ChaChaCipher {
    pub fn new() -> Self {
        Self
    }

    fn cipher_for(key: &EncryptionKey) -> Option<ChaCha20Poly1305> {
        let bytes = key.as_bytes();
        if bytes.len() != KEY_LEN {
            return None;
        }
        Some(ChaCha20Poly1305::new(Key::from_slice(bytes)))
    }
}

impl MessageCipher for ChaChaCipher {
    fn encrypt(&self, plaintext: &str, key: &EncryptionKey) -> Result<String, CryptoError> {
        let cipher = Self::cipher_for(key).ok_or_else(|| {
            CryptoError::Encryption(format!("key must be {} bytes", KEY_LEN))
        })?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);
        Ok(base64::engine::general_purpose::STANDARD.encode(&combined))
    }

    fn decrypt(&self, ciphertext: &str, key: &EncryptionKey) -> Result<String, CryptoError> {
        let cipher = Self::cipher_for(key).ok_or(CryptoError::Decryption)?;
        let combined = base64::engine::general_purpose::STANDARD
            .decode(ciphertext)
            .map_err(|_| CryptoError::Decryption)?;
        if combined.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::Decryption);
        }

        let (nonce_bytes, sealed) = combined.split_at(NONCE_LEN);
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|_| CryptoError::Decryption)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::Decryption)
    }
}
