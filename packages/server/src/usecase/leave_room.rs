//! UseCase: ルームからの退出
//!
//! デフォルトルームからは退出できません。現在いるルームから退出すると
//! デフォルトルームへ戻ります。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, MessagePusher, Notification, RoomId, RoomRepository,
};

use super::{error::ChatError, relocate::RoomRelocator, require_identity};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    relocator: Arc<RoomRelocator>,
}

impl LeaveRoomUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        relocator: Arc<RoomRelocator>,
    ) -> Self {
        Self {
            registry,
            rooms,
            message_pusher,
            relocator,
        }
    }

    pub async fn execute(&self, connection_id: &ConnectionId, room_id: &str) -> Result<(), ChatError> {
        let identity = require_identity(self.registry.as_ref(), connection_id).await?;
        let room = RoomId::new(room_id).map_err(|_| ChatError::NotFound(room_id.to_string()))?;

        let default_room = self.rooms.default_room_id();
        if room == default_room {
            return Err(ChatError::Forbidden(
                "you cannot leave the default room".to_string(),
            ));
        }
        // 存在しないルームは NotFound、参加していないルームは Forbidden
        if !self.rooms.is_member(&room, &identity.username).await? {
            return Err(ChatError::Forbidden(format!(
                "you are not in room '{}'",
                room
            )));
        }

        self.message_pusher
            .push_to(connection_id, &Notification::LeftRoom { room: room.clone() })
            .await?;

        if identity.current_room.as_ref() == Some(&room) {
            self.relocator
                .relocate(connection_id, &identity.username, &default_room)
                .await?;
        } else {
            self.rooms.leave(&room, &identity.username).await;
        }
        Ok(())
    }
}
