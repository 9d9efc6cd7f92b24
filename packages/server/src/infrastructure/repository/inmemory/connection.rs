//! InMemory Connection Registry 実装
//!
//! 接続 ID → ユーザー名・現在のルームの対応を 1 つの Mutex で保護します。
//! ユーザー名の重複チェックと登録は同じクリティカルセクション内で行うため、
//! 同名の同時取得はちょうど 1 つだけが成功します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionRegistry, Departure, RegistryError, RoomId, Session, Timestamp,
    Username,
};

struct ConnectionEntry {
    username: Option<Username>,
    current_room: Option<RoomId>,
    connected_at: Timestamp,
    /// Order in which the username was claimed
    claim_seq: u64,
}

#[derive(Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    owners: HashMap<Username, ConnectionId>,
    next_claim_seq: u64,
}

/// インメモリ Connection Registry 実装
pub struct InMemoryConnectionRegistry {
    state: Mutex<RegistryState>,
    max_username_length: usize,
}

impl InMemoryConnectionRegistry {
    /// 新しい InMemoryConnectionRegistry を作成
    pub fn new(max_username_length: usize) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            max_username_length,
        }
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, connected_at: Timestamp) -> ConnectionId {
        let connection_id = ConnectionId::generate();
        let mut state = self.state.lock().await;
        state.connections.insert(
            connection_id,
            ConnectionEntry {
                username: None,
                current_room: None,
                connected_at,
                claim_seq: 0,
            },
        );
        tracing::debug!("Connection '{}' registered", connection_id);
        connection_id
    }

    async fn claim_username(
        &self,
        connection_id: &ConnectionId,
        name: &str,
    ) -> Result<Username, RegistryError> {
        let username = Username::parse(name, self.max_username_length)?;

        let mut state = self.state.lock().await;
        let state = &mut *state;

        let entry = state
            .connections
            .get_mut(connection_id)
            .ok_or(RegistryError::ConnectionNotFound)?;
        if let Some(current) = &entry.username {
            return Err(RegistryError::AlreadyIdentified(current.to_string()));
        }
        if state.owners.contains_key(&username) {
            return Err(RegistryError::NameTaken(username.into_string()));
        }

        state.next_claim_seq += 1;
        entry.username = Some(username.clone());
        entry.claim_seq = state.next_claim_seq;
        state.owners.insert(username.clone(), *connection_id);

        Ok(username)
    }

    async fn release_username(&self, connection_id: &ConnectionId) -> Option<Username> {
        let mut state = self.state.lock().await;
        let entry = state.connections.get_mut(connection_id)?;
        let username = entry.username.take()?;
        entry.current_room = None;
        entry.claim_seq = 0;
        state.owners.remove(&username);
        tracing::debug!("Connection '{}' released username '{}'", connection_id, username);
        Some(username)
    }

    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Departure> {
        let mut state = self.state.lock().await;
        let entry = state.connections.remove(connection_id)?;
        if let Some(username) = &entry.username {
            state.owners.remove(username);
        }
        tracing::debug!("Connection '{}' unregistered", connection_id);

        Some(Departure {
            username: entry.username,
            current_room: entry.current_room,
        })
    }

    async fn list_usernames(&self) -> Vec<Username> {
        let state = self.state.lock().await;
        let mut claimed: Vec<(u64, Username)> = state
            .connections
            .values()
            .filter_map(|entry| entry.username.clone().map(|name| (entry.claim_seq, name)))
            .collect();
        claimed.sort_by_key(|(seq, _)| *seq);
        claimed.into_iter().map(|(_, name)| name).collect()
    }

    async fn session(&self, connection_id: &ConnectionId) -> Option<Session> {
        let state = self.state.lock().await;
        state.connections.get(connection_id).map(|entry| Session {
            connection_id: *connection_id,
            username: entry.username.clone(),
            current_room: entry.current_room.clone(),
            connected_at: entry.connected_at,
        })
    }

    async fn connection_of(&self, username: &Username) -> Option<ConnectionId> {
        let state = self.state.lock().await;
        state.owners.get(username).copied()
    }

    async fn set_current_room(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
    ) -> Result<Option<RoomId>, RegistryError> {
        let mut state = self.state.lock().await;
        let entry = state
            .connections
            .get_mut(connection_id)
            .ok_or(RegistryError::ConnectionNotFound)?;
        Ok(entry.current_room.replace(room_id))
    }

    async fn connections_in_room(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        state
            .connections
            .iter()
            .filter(|(_, entry)| entry.current_room.as_ref() == Some(room_id))
            .map(|(id, _)| *id)
            .collect()
    }

    async fn all_connections(&self) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        state.connections.keys().copied().collect()
    }

    async fn count_connections(&self) -> usize {
        self.state.lock().await.connections.len()
    }

    async fn count_identified(&self) -> usize {
        self.state.lock().await.owners.len()
    }
}
