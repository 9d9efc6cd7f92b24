//! UseCase: ルーム詳細の取得（HTTP API 用）

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRepository};

use super::error::ChatError;

/// ルーム詳細取得のユースケース
///
/// 非公開ルームは存在しないものとして扱います。
pub struct GetRoomDetailUseCase {
    rooms: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    pub async fn execute(&self, room_id: &str) -> Result<Room, ChatError> {
        let not_found = || ChatError::NotFound(room_id.to_string());
        let id = RoomId::new(room_id).map_err(|_| not_found())?;
        let room = self.rooms.get_room(&id).await.map_err(|_| not_found())?;
        if room.is_private {
            return Err(not_found());
        }
        Ok(room)
    }
}
