//! UseCase: ルームの削除

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, MessagePusher, Notification, RoomId, RoomRepository,
};

use super::{error::ChatError, require_identity, sequencer::RoomSequencer};

/// ルーム削除のユースケース
///
/// 削除できるのは作成者だけで、メンバーが残っているルームとデフォルトルームは削除できません。
pub struct DeleteRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: Arc<RoomSequencer>,
}

impl DeleteRoomUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: Arc<RoomSequencer>,
    ) -> Self {
        Self {
            registry,
            rooms,
            message_pusher,
            sequencer,
        }
    }

    pub async fn execute(&self, connection_id: &ConnectionId, room_id: &str) -> Result<(), ChatError> {
        let identity = require_identity(self.registry.as_ref(), connection_id).await?;
        let room = RoomId::new(room_id).map_err(|_| ChatError::NotFound(room_id.to_string()))?;

        {
            // 参加処理と同じレーンの中で削除し、削除済みのルームへの参加を防ぐ
            let _lane = self.sequencer.acquire(&room).await;
            self.rooms.delete_room(&room, &identity.username).await?;
            self.sequencer.forget(&room).await;
        }
        tracing::info!(%room, deleted_by = %identity.username, "room deleted");

        self.message_pusher
            .push_to(connection_id, &Notification::RoomDeleted { room })
            .await?;
        Ok(())
    }
}
