//! UseCase: ルームの作成

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, MessagePusher, NewRoom, Notification, RoomId,
    RoomName, RoomRepository, Username,
};

use super::{ChatLimits, error::ChatError, require_identity};

/// `create_room` コマンドの入力
#[derive(Debug, Clone, Default)]
pub struct CreateRoomInput {
    pub room_id: Option<String>,
    pub name: Option<String>,
    pub description: String,
    pub is_private: bool,
    pub max_members: Option<usize>,
}

/// ルーム作成のユースケース
///
/// 作成者はルームに自動では参加しません。成功時の通知は作成者への `room_created` のみです。
pub struct CreateRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    limits: ChatLimits,
}

impl CreateRoomUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        limits: ChatLimits,
    ) -> Self {
        Self {
            registry,
            rooms,
            message_pusher,
            limits,
        }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        input: CreateRoomInput,
    ) -> Result<(), ChatError> {
        let identity = require_identity(self.registry.as_ref(), connection_id).await?;

        let new_room = self.build_room(input, identity.username)?;
        let summary = self.rooms.create_room(new_room).await?;
        tracing::info!(room = %summary.id, private = summary.is_private, "room created");

        self.message_pusher
            .push_to(connection_id, &Notification::RoomCreated(summary))
            .await?;
        Ok(())
    }

    fn build_room(
        &self,
        input: CreateRoomInput,
        created_by: Username,
    ) -> Result<NewRoom, ChatError> {
        let max_len = self.limits.max_room_name_length;
        let raw_id = input
            .room_id
            .as_deref()
            .or(input.name.as_deref())
            .unwrap_or_default();
        let id = RoomId::from_name(raw_id, max_len)?;
        let name = RoomName::parse(input.name.as_deref().unwrap_or(raw_id), max_len)?;
        let max_members = input
            .max_members
            .unwrap_or(self.limits.max_room_members)
            .clamp(1, self.limits.max_room_members);

        Ok(NewRoom {
            id,
            name,
            description: input.description.trim().to_string(),
            is_private: input.is_private,
            created_by: Some(created_by),
            max_members,
        })
    }
}
