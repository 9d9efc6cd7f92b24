//! 暗号化の実装
//!
//! - `chacha`: ChaCha20-Poly1305 による `MessageCipher` 実装
//! - `keys`: マスターシークレットからの鍵導出（HKDF-SHA256）

pub mod chacha;
pub mod keys;

pub use chacha::ChaChaCipher;
pub use keys::{build_key_ring, derive_key};
