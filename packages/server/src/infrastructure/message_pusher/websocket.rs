//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - `Notification` を JSON フレームにエンコードして送信キューへ積む
//!
//! 実際のソケットへの書き込みは UI 層の `pusher_loop` が行います。
//! ここでは送信キューへの enqueue だけを行うため、遅いクライアントが
//! 他のクライアントへの配信を止めることはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, Notification, PusherChannel},
    infrastructure::dto::websocket::ServerEvent,
};

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// Key: 接続 ID, Value: その接続の送信キュー
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    fn encode(notification: &Notification) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerEvent::from(notification.clone()))
            .map_err(|e| MessagePushError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection_id, sender);
        tracing::debug!(%connection_id, "connection registered to MessagePusher");
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(connection_id).is_some() {
            tracing::debug!(%connection_id, "connection unregistered from MessagePusher");
        }
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        let frame = Self::encode(notification)?;
        let sender = {
            let clients = self.clients.lock().await;
            clients.get(connection_id).cloned()
        };

        let sender =
            sender.ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;
        sender
            .send(frame)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!(%connection_id, kind = notification.kind(), "pushed notification");
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        if targets.is_empty() {
            return Ok(());
        }
        let frame = Self::encode(notification)?;

        // 送信先のスナップショットを取ってからロックを解放して送信する
        let senders: Vec<(ConnectionId, Option<PusherChannel>)> = {
            let clients = self.clients.lock().await;
            targets
                .into_iter()
                .map(|id| {
                    let sender = clients.get(&id).cloned();
                    (id, sender)
                })
                .collect()
        };

        for (connection_id, sender) in senders {
            match sender {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => {
                    if let Err(e) = sender.send(frame.clone()) {
                        tracing::debug!(%connection_id, "failed to push notification: {}", e);
                    }
                }
                None => {
                    tracing::debug!(%connection_id, "connection gone during broadcast, skipping");
                }
            }
        }
        tracing::debug!(kind = notification.kind(), "broadcasted notification");

        Ok(())
    }
}
