//! UseCase: ルームのメンバー一覧

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, MessagePusher, Notification, RoomId, RoomRepository,
};

use super::error::ChatError;

/// メンバー一覧取得のユースケース
///
/// 呼び出し元から見えないルーム（非公開でメンバーでも招待済みでもない）は NotFound。
pub struct GetRoomMembersUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl GetRoomMembersUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            rooms,
            message_pusher,
        }
    }

    pub async fn execute(&self, connection_id: &ConnectionId, room_id: &str) -> Result<(), ChatError> {
        let not_found = || ChatError::NotFound(room_id.to_string());
        let viewer = self
            .registry
            .session(connection_id)
            .await
            .and_then(|session| session.username);
        let id = RoomId::new(room_id).map_err(|_| not_found())?;
        let room = self.rooms.get_room(&id).await?;
        if !room.is_visible_to(viewer.as_ref()) {
            return Err(not_found());
        }

        self.message_pusher
            .push_to(
                connection_id,
                &Notification::RoomMembers {
                    room: id,
                    members: room.members(),
                },
            )
            .await?;
        Ok(())
    }
}
