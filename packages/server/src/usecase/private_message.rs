//! UseCase: 個別メッセージ
//!
//! 個別メッセージは送信時のフラグに関係なく、常に DM 用の鍵で暗号化されます。
//! 受信者には `private_message`、送信者には確認として `private_message_sent` が届き、
//! ルームの履歴には残りません。

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ConnectionId, ConnectionRegistry, DirectMessage, DirectMessageRepository, KeyRing,
    MessageCipher, MessageContent, MessagePusher, Notification, Timestamp, Username,
};

use super::{ChatLimits, error::ChatError, require_identity};

/// 個別メッセージ送信のユースケース
pub struct PrivateMessageUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    direct_messages: Arc<dyn DirectMessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    cipher: Arc<dyn MessageCipher>,
    keys: Arc<KeyRing>,
    clock: Arc<dyn Clock>,
    limits: ChatLimits,
}

impl PrivateMessageUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        direct_messages: Arc<dyn DirectMessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        cipher: Arc<dyn MessageCipher>,
        keys: Arc<KeyRing>,
        clock: Arc<dyn Clock>,
        limits: ChatLimits,
    ) -> Self {
        Self {
            registry,
            direct_messages,
            message_pusher,
            cipher,
            keys,
            clock,
            limits,
        }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        receiver: &str,
        message: &str,
        encrypt: bool,
    ) -> Result<(), ChatError> {
        let identity = require_identity(self.registry.as_ref(), connection_id).await?;

        let receiver = Username::parse(receiver, self.limits.max_username_length)
            .map_err(|_| ChatError::UserNotFound(receiver.trim().to_string()))?;
        if receiver == identity.username {
            return Err(ChatError::Forbidden(
                "you cannot send a private message to yourself".to_string(),
            ));
        }
        let receiver_connection = self
            .registry
            .connection_of(&receiver)
            .await
            .ok_or_else(|| ChatError::UserNotFound(receiver.to_string()))?;
        let content = MessageContent::parse(message, self.limits.max_message_length)?;

        if !encrypt {
            tracing::debug!("private messages are always encrypted, ignoring encrypt=false");
        }
        let ciphertext = self
            .cipher
            .encrypt(content.as_str(), self.keys.direct_key())?;

        let direct_message = DirectMessage {
            sender: identity.username,
            receiver,
            content: ciphertext,
            timestamp: Timestamp::new(self.clock.now_millis()),
            encrypted: true,
        };
        self.direct_messages.record(direct_message.clone()).await;

        // 受信者が直前に切断していても送信者への確認は返す
        if let Err(e) = self
            .message_pusher
            .push_to(
                &receiver_connection,
                &Notification::PrivateMessage(direct_message.clone()),
            )
            .await
        {
            tracing::warn!("failed to deliver private message: {}", e);
        }
        self.message_pusher
            .push_to(
                connection_id,
                &Notification::PrivateMessageSent(direct_message),
            )
            .await?;

        Ok(())
    }
}
