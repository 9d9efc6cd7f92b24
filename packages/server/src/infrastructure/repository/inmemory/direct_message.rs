//! InMemory Direct Message Repository 実装
//!
//! 2 ユーザー間の会話ごとに、最新のメッセージを上限付きで保持します。

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{DirectMessage, DirectMessageRepository, Username};

/// Default number of messages kept per conversation
pub const DEFAULT_CONVERSATION_CAPACITY: usize = 100;

/// Order-independent key of a conversation between two users
type ConversationKey = (Username, Username);

fn conversation_key(a: &Username, b: &Username) -> ConversationKey {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// インメモリ Direct Message Repository 実装
pub struct InMemoryDirectMessageRepository {
    conversations: Mutex<HashMap<ConversationKey, VecDeque<DirectMessage>>>,
    capacity: usize,
}

impl InMemoryDirectMessageRepository {
    pub fn new(capacity: usize) -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
            capacity,
        }
    }
}

impl Default for InMemoryDirectMessageRepository {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERSATION_CAPACITY)
    }
}

#[async_trait]
impl DirectMessageRepository for InMemoryDirectMessageRepository {
    async fn record(&self, message: DirectMessage) {
        let key = conversation_key(&message.sender, &message.receiver);
        let mut conversations = self.conversations.lock().await;
        let conversation = conversations.entry(key).or_default();
        conversation.push_back(message);
        while conversation.len() > self.capacity {
            conversation.pop_front();
        }
    }

    async fn conversation(
        &self,
        user: &Username,
        other: &Username,
        limit: usize,
    ) -> Vec<DirectMessage> {
        let conversations = self.conversations.lock().await;
        conversations
            .get(&conversation_key(user, other))
            .map(|messages| {
                let skip = messages.len().saturating_sub(limit);
                messages.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }
}
