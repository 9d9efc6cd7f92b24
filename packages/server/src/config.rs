//! Server configuration.

use std::fmt;

use crate::{
    domain::{PrivateRoomPolicy, entity::DEFAULT_HISTORY_CAPACITY},
    usecase::ChatLimits,
};

/// Runtime settings of the chat server.
///
/// The binary builds this from command line flags and environment variables;
/// tests build it directly.
#[derive(Clone)]
pub struct ServerConfig {
    /// Display name of the room every user joins first
    pub default_room: String,
    pub default_room_max_members: usize,
    pub history_capacity: usize,
    pub limits: ChatLimits,
    pub private_room_policy: PrivateRoomPolicy,
    /// Master secret for key derivation. A random one is used when absent.
    pub encryption_secret: Option<String>,
    /// Dedicated secrets for individual rooms, as (room, secret)
    pub room_secrets: Vec<(String, String)>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_room: "General".to_string(),
            default_room_max_members: 1000,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            limits: ChatLimits::default(),
            private_room_policy: PrivateRoomPolicy::default(),
            encryption_secret: None,
            room_secrets: Vec::new(),
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let room_secrets: Vec<&str> = self.room_secrets.iter().map(|(r, _)| r.as_str()).collect();
        f.debug_struct("ServerConfig")
            .field("default_room", &self.default_room)
            .field("default_room_max_members", &self.default_room_max_members)
            .field("history_capacity", &self.history_capacity)
            .field("limits", &self.limits)
            .field("private_room_policy", &self.private_room_policy)
            .field(
                "encryption_secret",
                &self.encryption_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("room_secrets", &room_secrets)
            .finish()
    }
}
