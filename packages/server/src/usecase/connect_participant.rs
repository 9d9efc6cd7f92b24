//! UseCase: 接続の受付

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{ConnectionId, ConnectionRegistry, MessagePusher, PusherChannel, Timestamp};

/// 接続受付のユースケース
///
/// 接続を Registry に登録し、送信キューを MessagePusher に登録します。
/// この時点ではまだ何も送信しません（ユーザー名の設定を待つ）。
pub struct ConnectParticipantUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
        }
    }

    /// 接続を登録し、割り当てた接続 ID を返す
    pub async fn execute(&self, sender: PusherChannel) -> ConnectionId {
        let connected_at = Timestamp::new(self.clock.now_millis());
        let connection_id = self.registry.register(connected_at).await;
        self.message_pusher
            .register_client(connection_id, sender)
            .await;

        tracing::info!(%connection_id, "connection registered");
        connection_id
    }
}
