//! UseCase のテスト用ヘルパー

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use hiroba_shared::time::FixedClock;
use tokio::sync::mpsc;

use super::*;
use crate::{
    domain::{
        ConnectionRegistry, KeyRing, MessagePushError, MessagePusher, NewRoom, Notification,
        PusherChannel, RoomName,
    },
    infrastructure::{
        crypto::{ChaChaCipher, build_key_ring},
        repository::{
            InMemoryConnectionRegistry, InMemoryDirectMessageRepository, InMemoryRoomRepository,
            RoomStoreSettings,
        },
    },
};

pub const NOW: i64 = 1_700_000_000_000;

/// 送信された通知を記録する MessagePusher
///
/// 登録されていない接続への送信は実装と同じく読み飛ばす（`push_to` はエラー）。
#[derive(Default)]
pub struct RecordingPusher {
    registered: Mutex<HashSet<ConnectionId>>,
    sent: Mutex<Vec<(ConnectionId, Notification)>>,
}

impl RecordingPusher {
    /// 接続が受け取った通知（受信順）
    pub fn received(&self, connection_id: &ConnectionId) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == connection_id)
            .map(|(_, n)| n.clone())
            .collect()
    }

    /// 接続が受け取った通知の種類（受信順）
    pub fn kinds(&self, connection_id: &ConnectionId) -> Vec<&'static str> {
        self.received(connection_id)
            .iter()
            .map(Notification::kind)
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl MessagePusher for RecordingPusher {
    async fn register_client(&self, connection_id: ConnectionId, _sender: PusherChannel) {
        self.registered.lock().unwrap().insert(connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        self.registered.lock().unwrap().remove(connection_id);
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        if !self.registered.lock().unwrap().contains(connection_id) {
            return Err(MessagePushError::ClientNotFound(connection_id.to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((*connection_id, notification.clone()));
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        let registered = self.registered.lock().unwrap().clone();
        let mut sent = self.sent.lock().unwrap();
        for target in targets {
            if registered.contains(&target) {
                sent.push((target, notification.clone()));
            }
        }
        Ok(())
    }
}

/// インメモリ実装と RecordingPusher を組み合わせたテスト環境
pub struct Harness {
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub rooms: Arc<InMemoryRoomRepository>,
    pub direct_messages: Arc<InMemoryDirectMessageRepository>,
    pub pusher: Arc<RecordingPusher>,
    pub cipher: Arc<ChaChaCipher>,
    pub keys: Arc<KeyRing>,
    pub sequencer: Arc<RoomSequencer>,
    pub clock: Arc<FixedClock>,
    pub limits: ChatLimits,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(RoomStoreSettings::default())
    }

    pub fn with_settings(settings: RoomStoreSettings) -> Self {
        let clock = Arc::new(FixedClock::new(NOW));
        let limits = ChatLimits::default();
        let default_room = NewRoom {
            id: RoomId::new("General").unwrap(),
            name: RoomName::parse("General", limits.max_room_name_length).unwrap(),
            description: "Default room".to_string(),
            is_private: false,
            created_by: None,
            max_members: 1000,
        };

        Self {
            registry: Arc::new(InMemoryConnectionRegistry::new(limits.max_username_length)),
            rooms: Arc::new(InMemoryRoomRepository::new(
                default_room,
                settings,
                clock.clone(),
            )),
            direct_messages: Arc::new(InMemoryDirectMessageRepository::default()),
            pusher: Arc::new(RecordingPusher::default()),
            cipher: Arc::new(ChaChaCipher::new()),
            keys: Arc::new(build_key_ring(Some("test secret"), &[]).unwrap()),
            sequencer: Arc::new(RoomSequencer::new()),
            clock,
            limits,
        }
    }

    pub fn general() -> RoomId {
        RoomId::new("general").unwrap()
    }

    pub fn relocator(&self) -> Arc<RoomRelocator> {
        Arc::new(RoomRelocator::new(
            self.registry.clone(),
            self.rooms.clone(),
            self.pusher.clone(),
            self.sequencer.clone(),
        ))
    }

    pub fn connect_participant(&self) -> ConnectParticipantUseCase {
        ConnectParticipantUseCase::new(
            self.registry.clone(),
            self.pusher.clone(),
            self.clock.clone(),
        )
    }

    pub fn disconnect_participant(&self) -> DisconnectParticipantUseCase {
        DisconnectParticipantUseCase::new(
            self.registry.clone(),
            self.rooms.clone(),
            self.pusher.clone(),
            self.sequencer.clone(),
        )
    }

    pub fn set_username(&self) -> SetUsernameUseCase {
        SetUsernameUseCase::new(
            self.registry.clone(),
            self.rooms.clone(),
            self.pusher.clone(),
            self.relocator(),
            self.sequencer.clone(),
        )
    }

    pub fn create_room(&self) -> CreateRoomUseCase {
        CreateRoomUseCase::new(
            self.registry.clone(),
            self.rooms.clone(),
            self.pusher.clone(),
            self.limits,
        )
    }

    pub fn join_room(&self) -> JoinRoomUseCase {
        JoinRoomUseCase::new(self.registry.clone(), self.relocator())
    }

    pub fn leave_room(&self) -> LeaveRoomUseCase {
        LeaveRoomUseCase::new(
            self.registry.clone(),
            self.rooms.clone(),
            self.pusher.clone(),
            self.relocator(),
        )
    }

    pub fn send_message(&self) -> SendMessageUseCase {
        SendMessageUseCase::new(
            self.registry.clone(),
            self.rooms.clone(),
            self.pusher.clone(),
            self.cipher.clone(),
            self.keys.clone(),
            self.sequencer.clone(),
            self.clock.clone(),
            self.limits.max_message_length,
        )
    }

    pub fn private_message(&self) -> PrivateMessageUseCase {
        PrivateMessageUseCase::new(
            self.registry.clone(),
            self.direct_messages.clone(),
            self.pusher.clone(),
            self.cipher.clone(),
            self.keys.clone(),
            self.clock.clone(),
            self.limits,
        )
    }

    pub fn get_conversation(&self) -> GetConversationUseCase {
        GetConversationUseCase::new(
            self.registry.clone(),
            self.direct_messages.clone(),
            self.pusher.clone(),
            self.cipher.clone(),
            self.keys.clone(),
            self.limits.max_username_length,
        )
    }

    pub fn get_rooms(&self) -> GetRoomsUseCase {
        GetRoomsUseCase::new(self.registry.clone(), self.rooms.clone(), self.pusher.clone())
    }

    pub fn get_room_members(&self) -> GetRoomMembersUseCase {
        GetRoomMembersUseCase::new(self.registry.clone(), self.rooms.clone(), self.pusher.clone())
    }

    pub fn invite_to_room(&self) -> InviteToRoomUseCase {
        InviteToRoomUseCase::new(
            self.registry.clone(),
            self.rooms.clone(),
            self.pusher.clone(),
            self.limits.max_username_length,
        )
    }

    pub fn delete_room(&self) -> DeleteRoomUseCase {
        DeleteRoomUseCase::new(
            self.registry.clone(),
            self.rooms.clone(),
            self.pusher.clone(),
            self.sequencer.clone(),
        )
    }

    pub fn get_stats(&self) -> GetStatsUseCase {
        GetStatsUseCase::new(self.registry.clone(), self.rooms.clone(), self.pusher.clone())
    }

    /// 接続を受け付ける（ユーザー名は未設定）
    pub async fn connect(&self) -> ConnectionId {
        let (tx, _rx) = mpsc::unbounded_channel();
        self.connect_participant().execute(tx).await
    }

    /// 接続してユーザー名を設定する（デフォルトルームに参加済みになる）
    pub async fn identify(&self, name: &str) -> ConnectionId {
        let connection_id = self.connect().await;
        self.set_username()
            .execute(&connection_id, name)
            .await
            .unwrap();
        connection_id
    }

    /// 接続してユーザー名を設定し、既存のルームへ移動する
    pub async fn identify_in_room(&self, name: &str, room: &str) -> ConnectionId {
        let connection_id = self.identify(name).await;
        self.join_room().execute(&connection_id, room).await.unwrap();
        connection_id
    }

    pub async fn current_room(&self, connection_id: &ConnectionId) -> Option<RoomId> {
        self.registry
            .session(connection_id)
            .await
            .and_then(|s| s.current_room)
    }
}
