//! UseCase: 個別メッセージの会話履歴

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, DirectMessage, DirectMessageRepository, KeyRing,
    MessageCipher, MessagePusher, Notification, Username,
};

use super::{error::ChatError, require_identity};

/// 返す会話履歴の最大件数
pub const CONVERSATION_LIMIT: usize = 50;

/// 会話履歴取得のユースケース
///
/// 履歴は復号してから返します。復号できなかったメッセージは返さず、
/// 履歴を送ったあとで `DecryptionFailed` を返します（暗号文は返さない）。
pub struct GetConversationUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    direct_messages: Arc<dyn DirectMessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    cipher: Arc<dyn MessageCipher>,
    keys: Arc<KeyRing>,
    max_username_length: usize,
}

impl GetConversationUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        direct_messages: Arc<dyn DirectMessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        cipher: Arc<dyn MessageCipher>,
        keys: Arc<KeyRing>,
        max_username_length: usize,
    ) -> Self {
        Self {
            registry,
            direct_messages,
            message_pusher,
            cipher,
            keys,
            max_username_length,
        }
    }

    pub async fn execute(&self, connection_id: &ConnectionId, with_user: &str) -> Result<(), ChatError> {
        let identity = require_identity(self.registry.as_ref(), connection_id).await?;
        let other = Username::parse(with_user, self.max_username_length)?;

        let stored = self
            .direct_messages
            .conversation(&identity.username, &other, CONVERSATION_LIMIT)
            .await;

        let mut withheld = 0;
        let mut messages = Vec::with_capacity(stored.len());
        for message in stored {
            match self.open(message) {
                Ok(message) => messages.push(message),
                Err(_) => withheld += 1,
            }
        }

        self.message_pusher
            .push_to(
                connection_id,
                &Notification::ConversationHistory {
                    with_user: other.into_string(),
                    messages,
                },
            )
            .await?;

        if withheld > 0 {
            tracing::warn!(withheld, "withheld private messages that failed to decrypt");
            return Err(ChatError::DecryptionFailed);
        }
        Ok(())
    }

    fn open(&self, mut message: DirectMessage) -> Result<DirectMessage, ChatError> {
        if message.encrypted {
            message.content = self
                .cipher
                .decrypt(&message.content, self.keys.direct_key())?;
        }
        Ok(message)
    }
}
