//! UseCase: サーバーの統計

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, MessagePusher, Notification, RoomRepository, ServerStats,
};

use super::error::ChatError;

pub struct GetStatsUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl GetStatsUseCase {
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

    pub async fn snapshot(&self) -> ServerStats {
        ServerStats {
            users_online: self.registry.count_identified().await,
            connections: self.registry.count_connections().await,
            rooms: self.rooms.count_rooms().await,
        }
    }

    pub async fn execute(&self, connection_id: &ConnectionId) -> Result<(), ChatError> {
        let stats = self.snapshot().await;
        self.message_pusher
            .push_to(connection_id, &Notification::Stats(stats))
            .await?;
        Ok(())
    }
}
