//! UseCase: ルームへのメッセージ送信
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージの検証、暗号化、履歴への追加、ルーム内へのファンアウト
//!
//! ### なぜこのテストが必要か
//! - 送信者自身を含むルーム内の全接続に届くこと、他のルームには届かないことを保証する
//! - ルーム内の配信順序が履歴への追加順序と一致することを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：平文・暗号化メッセージの送信
//! - 異常系：空・長すぎる本文、メンバーでないルーム、ユーザー名未設定
//! - 並行：同じルームへの同時送信

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ChatMessage, ConnectionId, ConnectionRegistry, KeyRing, MessageCipher, MessageContent,
    MessagePusher, Notification, RoomId, RoomRepository, Timestamp,
};

use super::{error::ChatError, require_identity, sequencer::RoomSequencer};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    cipher: Arc<dyn MessageCipher>,
    keys: Arc<KeyRing>,
    sequencer: Arc<RoomSequencer>,
    clock: Arc<dyn Clock>,
    max_message_length: usize,
}

impl SendMessageUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        cipher: Arc<dyn MessageCipher>,
        keys: Arc<KeyRing>,
        sequencer: Arc<RoomSequencer>,
        clock: Arc<dyn Clock>,
        max_message_length: usize,
    ) -> Self {
        Self {
            registry,
            rooms,
            message_pusher,
            cipher,
            keys,
            sequencer,
            clock,
            max_message_length,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `room` - 送信先のルーム。省略時は現在のルーム
    /// * `encrypt` - ルームの鍵で暗号化してから保存・配信する
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        content: &str,
        room: Option<&str>,
        encrypt: bool,
    ) -> Result<(), ChatError> {
        let identity = require_identity(self.registry.as_ref(), connection_id).await?;
        let room = match room {
            Some(raw) => RoomId::new(raw).map_err(|_| ChatError::NotFound(raw.to_string()))?,
            None => identity
                .current_room
                .ok_or_else(|| ChatError::Forbidden("join a room first".to_string()))?,
        };
        let content = MessageContent::parse(content, self.max_message_length)?;

        if !self.rooms.is_member(&room, &identity.username).await? {
            return Err(ChatError::Forbidden(format!(
                "you are not a member of room '{}'",
                room
            )));
        }

        let body = if encrypt {
            self.cipher
                .encrypt(content.as_str(), self.keys.room_key(&room))?
        } else {
            content.into_string()
        };

        // 追加と enqueue を同じレーンで行い、配信順序を追加順序に揃える
        let _lane = self.sequencer.acquire(&room).await;
        let timestamp = Timestamp::new(self.clock.now_millis());
        let message = self
            .rooms
            .append_message(
                &room,
                ChatMessage::new(identity.username, room.clone(), body, timestamp, encrypt),
            )
            .await?;

        let targets = self.registry.connections_in_room(&room).await;
        tracing::debug!(
            room = %room,
            recipients = targets.len(),
            encrypted = encrypt,
            "broadcasting room message"
        );
        self.message_pusher
            .broadcast(targets, &Notification::ReceiveMessage(message))
            .await?;

        Ok(())
    }
}
