//! MessagePusher trait 定義
//!
//! UseCase 層が接続中のクライアントへ通知を送るためのインターフェース。
//! 具体的な送信方法（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, notification::Notification, value_object::ConnectionId};

/// Outbound queue of one connection (already-encoded frames)
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// クライアントへの通知インターフェース
///
/// `broadcast` は一部の宛先への送信失敗を許容し、切断済みの宛先は黙って読み飛ばします。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信キューを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信キューを削除（冪等）
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続へ通知を送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        notification: &Notification,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続へ通知を送信
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        notification: &Notification,
    ) -> Result<(), MessagePushError>;
}
