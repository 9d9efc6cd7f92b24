//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## 排他制御
//!
//! ルームの集合は `RwLock` で、各ルームは個別の `Mutex` で保護します。
//! 関係のないルーム同士はロックを奪い合いません。
//! ルームのロックを保持したままルーム集合のロックを取得することはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use hiroba_shared::time::Clock;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    ChatMessage, JoinOutcome, NewRoom, PrivateRoomPolicy, Room, RoomError, RoomId,
    RoomRepository, RoomSummary, Timestamp, Username,
    entity::DEFAULT_HISTORY_CAPACITY,
};

/// Room Store の設定
#[derive(Debug, Clone, Copy)]
pub struct RoomStoreSettings {
    /// ルームごとのメッセージ履歴の上限
    pub history_capacity: usize,
    /// 非公開ルームの扱い
    pub private_room_policy: PrivateRoomPolicy,
}

impl Default for RoomStoreSettings {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            private_room_policy: PrivateRoomPolicy::default(),
        }
    }
}

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<RoomId, Arc<Mutex<Room>>>>,
    default_room: RoomId,
    settings: RoomStoreSettings,
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    ///
    /// `default_room` は起動時に作成され、削除できません。
    pub fn new(default_room: NewRoom, settings: RoomStoreSettings, clock: Arc<dyn Clock>) -> Self {
        let default_id = default_room.id.clone();
        let room = Room::with_capacity(
            default_room,
            Timestamp::new(clock.now_millis()),
            settings.history_capacity,
        );

        let mut rooms = HashMap::new();
        rooms.insert(default_id.clone(), Arc::new(Mutex::new(room)));

        Self {
            rooms: RwLock::new(rooms),
            default_room: default_id,
            settings,
            clock,
        }
    }

    /// ルームのハンドルを取得（ルーム集合のロックはすぐに解放される）
    async fn room_handle(&self, room_id: &RoomId) -> Result<Arc<Mutex<Room>>, RoomError> {
        let rooms = self.rooms.read().await;
        rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))
    }

    async fn all_handles(&self) -> Vec<Arc<Mutex<Room>>> {
        let rooms = self.rooms.read().await;
        rooms.values().cloned().collect()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    fn default_room_id(&self) -> RoomId {
        self.default_room.clone()
    }

    async fn create_room(&self, new_room: NewRoom) -> Result<RoomSummary, RoomError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&new_room.id) {
            return Err(RoomError::RoomExists(new_room.id.into_string()));
        }

        let room = Room::with_capacity(
            new_room,
            Timestamp::new(self.clock.now_millis()),
            self.settings.history_capacity,
        );
        let summary = room.summary();
        rooms.insert(room.id.clone(), Arc::new(Mutex::new(room)));

        Ok(summary)
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RoomError> {
        let handle = self.room_handle(room_id).await?;
        let room = handle.lock().await;
        Ok(room.clone())
    }

    async fn list_rooms(&self, viewer: Option<&Username>) -> Vec<RoomSummary> {
        let mut summaries = Vec::new();
        for handle in self.all_handles().await {
            let room = handle.lock().await;
            if room.is_visible_to(viewer) {
                summaries.push(room.summary());
            }
        }

        // Default room first, then by id
        summaries.sort_by(|a, b| {
            (a.id != self.default_room, &a.id).cmp(&(b.id != self.default_room, &b.id))
        });
        summaries
    }

    async fn join(&self, room_id: &RoomId, username: &Username) -> Result<JoinOutcome, RoomError> {
        let handle = self.room_handle(room_id).await?;
        let mut room = handle.lock().await;
        let newly_joined = room.add_member(username.clone(), self.settings.private_room_policy)?;

        Ok(JoinOutcome {
            room: room.summary(),
            history: room.history(),
            newly_joined,
        })
    }

    async fn leave(&self, room_id: &RoomId, username: &Username) -> bool {
        match self.room_handle(room_id).await {
            Ok(handle) => handle.lock().await.remove_member(username),
            Err(_) => false,
        }
    }

    async fn append_message(
        &self,
        room_id: &RoomId,
        message: ChatMessage,
    ) -> Result<ChatMessage, RoomError> {
        let handle = self.room_handle(room_id).await?;
        let mut room = handle.lock().await;
        let evicted = room.push_message(message.clone());
        if evicted > 0 {
            tracing::debug!(
                "Evicted {} message(s) from history of room '{}'",
                evicted,
                room_id
            );
        }
        Ok(message)
    }

    async fn remove_user_everywhere(&self, username: &Username) -> Vec<RoomId> {
        let mut left = Vec::new();
        for handle in self.all_handles().await {
            let mut room = handle.lock().await;
            if room.remove_member(username) {
                left.push(room.id.clone());
            }
        }
        left
    }

    async fn is_member(&self, room_id: &RoomId, username: &Username) -> Result<bool, RoomError> {
        let handle = self.room_handle(room_id).await?;
        let room = handle.lock().await;
        Ok(room.is_member(username))
    }

    async fn members(&self, room_id: &RoomId) -> Result<Vec<Username>, RoomError> {
        let handle = self.room_handle(room_id).await?;
        let room = handle.lock().await;
        Ok(room.members())
    }

    async fn invite(
        &self,
        room_id: &RoomId,
        inviter: &Username,
        invitee: Username,
    ) -> Result<(), RoomError> {
        let handle = self.room_handle(room_id).await?;
        let mut room = handle.lock().await;
        room.invite(inviter, invitee)
    }

    async fn delete_room(
        &self,
        room_id: &RoomId,
        requested_by: &Username,
    ) -> Result<(), RoomError> {
        if *room_id == self.default_room {
            return Err(RoomError::Forbidden(
                "the default room cannot be deleted".to_string(),
            ));
        }

        let mut rooms = self.rooms.write().await;
        let handle = rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;
        {
            let room = handle.lock().await;
            if room.created_by.as_ref() != Some(requested_by) {
                return Err(RoomError::Forbidden(format!(
                    "only the creator can delete room '{}'",
                    room_id
                )));
            }
            if room.member_count() > 0 {
                return Err(RoomError::RoomNotEmpty(room_id.to_string()));
            }
        }
        rooms.remove(room_id);

        Ok(())
    }

    async fn count_rooms(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoomName, entity::DEFAULT_MAX_MEMBERS};
    use hiroba_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - ルームの作成・参加・退出・削除
    // - メッセージ履歴の上限（FIFO による削除）
    // - 非公開ルームの一覧表示と参加ポリシー
    // - 切断時の全ルームからの削除
    //
    // 【なぜこのテストが必要か】
    // - Room Store はメンバー集合と履歴の唯一の所有者
    // - デフォルトルームが常に存在することを保証する必要がある
    // ========================================

    fn username(name: &str) -> Username {
        Username::parse(name, 32).unwrap()
    }

    fn new_room(name: &str, is_private: bool, created_by: Option<&str>) -> NewRoom {
        NewRoom {
            id: RoomId::new(name).unwrap(),
            name: RoomName::parse(name, 50).unwrap(),
            description: String::new(),
            is_private,
            created_by: created_by.map(username),
            max_members: DEFAULT_MAX_MEMBERS,
        }
    }

    fn create_test_repository_with(settings: RoomStoreSettings) -> InMemoryRoomRepository {
        InMemoryRoomRepository::new(
            new_room("General", false, None),
            settings,
            Arc::new(FixedClock::new(1000)),
        )
    }

    fn create_test_repository() -> InMemoryRoomRepository {
        create_test_repository_with(RoomStoreSettings::default())
    }

    fn message(room: &RoomId, n: usize) -> ChatMessage {
        ChatMessage::new(
            username("ann"),
            room.clone(),
            format!("message {n}"),
            Timestamp::new(n as i64),
            false,
        )
    }

    #[tokio::test]
    async fn test_default_room_exists() {
        // テスト項目: 起動時にデフォルトルームが存在する
        let repo = create_test_repository();

        let room = repo.get_room(&repo.default_room_id()).await.unwrap();

        assert_eq!(room.id.as_str(), "general");
        assert_eq!(room.name.as_str(), "General");
        assert_eq!(room.created_at, Timestamp::new(1000));
        assert_eq!(repo.count_rooms().await, 1);
    }

    #[tokio::test]
    async fn test_create_room_collision() {
        // テスト項目: 同じ ID のルームは作成できない（名前から導出した ID の衝突を含む）
        // given (前提条件):
        let repo = create_test_repository();
        repo.create_room(new_room("Rust Lovers", false, Some("ann")))
            .await
            .unwrap();

        // when (操作):
        let result = repo
            .create_room(new_room("rust   lovers", false, Some("bob")))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RoomError::RoomExists("rust-lovers".to_string())));
        assert_eq!(repo.count_rooms().await, 2);
    }

    #[tokio::test]
    async fn test_join_unknown_room() {
        // テスト項目: 存在しないルームへの参加は NotFound になる
        let repo = create_test_repository();

        let result = repo
            .join(&RoomId::new("ghost").unwrap(), &username("ann"))
            .await;

        assert_eq!(result, Err(RoomError::NotFound("ghost".to_string())));
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        // テスト項目: 既に参加しているルームへの再参加はメンバー数を変えない
        // given (前提条件):
        let repo = create_test_repository();
        let general = repo.default_room_id();
        let first = repo.join(&general, &username("ann")).await.unwrap();

        // when (操作):
        let second = repo.join(&general, &username("ann")).await.unwrap();

        // then (期待する結果):
        assert!(first.newly_joined);
        assert!(!second.newly_joined);
        assert_eq!(second.room.member_count, 1);
    }

    #[tokio::test]
    async fn test_join_replays_history() {
        // テスト項目: 参加時に履歴が古い順で返される
        let repo = create_test_repository();
        let general = repo.default_room_id();
        for n in 0..3 {
            repo.append_message(&general, message(&general, n))
                .await
                .unwrap();
        }

        let outcome = repo.join(&general, &username("bob")).await.unwrap();

        let contents: Vec<&str> = outcome.history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["message 0", "message 1", "message 2"]);
    }

    #[tokio::test]
    async fn test_append_message_evicts_fifo() {
        // テスト項目: 容量を超えると到着順で古いメッセージから削除される
        // given (前提条件):
        let repo = create_test_repository_with(RoomStoreSettings {
            history_capacity: 3,
            ..RoomStoreSettings::default()
        });
        let general = repo.default_room_id();

        // when (操作):
        for n in 0..5 {
            repo.append_message(&general, message(&general, n))
                .await
                .unwrap();
        }

        // then (期待する結果):
        let history = repo.get_room(&general).await.unwrap().history();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["message 2", "message 3", "message 4"]);
    }

    #[tokio::test]
    async fn test_append_message_unknown_room() {
        // テスト項目: 存在しないルームへのメッセージ追加は NotFound になる
        let repo = create_test_repository();
        let ghost = RoomId::new("ghost").unwrap();

        let result = repo.append_message(&ghost, message(&ghost, 0)).await;

        assert!(matches!(result, Err(RoomError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_private_rooms_are_unlisted_for_non_members() {
        // テスト項目: 非公開ルームはメンバー以外の一覧に表示されないが、ID で参加できる
        // given (前提条件):
        let repo = create_test_repository();
        repo.create_room(new_room("Secret", true, Some("ann")))
            .await
            .unwrap();
        let secret = RoomId::new("secret").unwrap();

        // when (操作):
        let for_bob = repo.list_rooms(Some(&username("bob"))).await;
        let for_ann = repo.list_rooms(Some(&username("ann"))).await;
        let join = repo.join(&secret, &username("bob")).await;
        let after_join = repo.list_rooms(Some(&username("bob"))).await;

        // then (期待する結果):
        assert_eq!(for_bob.len(), 1);
        assert_eq!(for_ann.len(), 2);
        assert!(join.is_ok());
        assert_eq!(after_join.len(), 2);
        assert_eq!(after_join[0].id.as_str(), "general");
    }

    #[tokio::test]
    async fn test_invite_only_policy() {
        // テスト項目: InviteOnly ポリシーでは招待されていないユーザーは Forbidden になる
        // given (前提条件):
        let repo = create_test_repository_with(RoomStoreSettings {
            private_room_policy: PrivateRoomPolicy::InviteOnly,
            ..RoomStoreSettings::default()
        });
        repo.create_room(new_room("Secret", true, Some("ann")))
            .await
            .unwrap();
        let secret = RoomId::new("secret").unwrap();

        // when (操作):
        let rejected = repo.join(&secret, &username("bob")).await;
        repo.join(&secret, &username("ann")).await.unwrap();
        repo.invite(&secret, &username("ann"), username("bob"))
            .await
            .unwrap();
        let accepted = repo.join(&secret, &username("bob")).await;

        // then (期待する結果):
        assert!(matches!(rejected, Err(RoomError::Forbidden(_))));
        assert!(accepted.unwrap().newly_joined);
    }

    #[tokio::test]
    async fn test_remove_user_everywhere() {
        // テスト項目: 切断時に全てのルームのメンバー集合からユーザーが削除される
        // given (前提条件):
        let repo = create_test_repository();
        repo.create_room(new_room("Rust", false, Some("ann")))
            .await
            .unwrap();
        let general = repo.default_room_id();
        let rust = RoomId::new("rust").unwrap();
        repo.join(&general, &username("ann")).await.unwrap();
        repo.join(&rust, &username("ann")).await.unwrap();
        repo.join(&rust, &username("bob")).await.unwrap();

        // when (操作):
        let mut left = repo.remove_user_everywhere(&username("ann")).await;
        left.sort();

        // then (期待する結果):
        assert_eq!(left, vec![general.clone(), rust.clone()]);
        assert!(repo.members(&general).await.unwrap().is_empty());
        assert_eq!(repo.members(&rust).await.unwrap(), vec![username("bob")]);
    }

    #[tokio::test]
    async fn test_leave_is_idempotent() {
        // テスト項目: 退出は冪等で、存在しないルームでもエラーにならない
        let repo = create_test_repository();
        let general = repo.default_room_id();
        repo.join(&general, &username("ann")).await.unwrap();

        assert!(repo.leave(&general, &username("ann")).await);
        assert!(!repo.leave(&general, &username("ann")).await);
        assert!(
            !repo
                .leave(&RoomId::new("ghost").unwrap(), &username("ann"))
                .await
        );
    }

    #[tokio::test]
    async fn test_delete_room_rules() {
        // テスト項目: 削除できるのは作成者が空のルームを削除する場合のみ
        // given (前提条件):
        let repo = create_test_repository();
        repo.create_room(new_room("Rust", false, Some("ann")))
            .await
            .unwrap();
        let rust = RoomId::new("rust").unwrap();
        repo.join(&rust, &username("bob")).await.unwrap();

        // when (操作) / then (期待する結果):
        assert!(matches!(
            repo.delete_room(&repo.default_room_id(), &username("ann"))
                .await,
            Err(RoomError::Forbidden(_))
        ));
        assert!(matches!(
            repo.delete_room(&rust, &username("bob")).await,
            Err(RoomError::Forbidden(_))
        ));
        assert_eq!(
            repo.delete_room(&rust, &username("ann")).await,
            Err(RoomError::RoomNotEmpty("rust".to_string()))
        );

        repo.leave(&rust, &username("bob")).await;
        assert_eq!(repo.delete_room(&rust, &username("ann")).await, Ok(()));
        assert!(matches!(
            repo.get_room(&rust).await,
            Err(RoomError::NotFound(_))
        ));
    }
}
