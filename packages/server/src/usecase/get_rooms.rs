//! UseCase: ルーム一覧の取得

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, MessagePusher, Notification, RoomRepository, RoomSummary,
};

use super::error::ChatError;

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl GetRoomsUseCase {
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

    /// 接続から見えるルームの一覧を `room_list` で返す（ユーザー名未設定でも可）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Result<(), ChatError> {
        let viewer = self
            .registry
            .session(connection_id)
            .await
            .and_then(|session| session.username);
        let rooms = self.rooms.list_rooms(viewer.as_ref()).await;

        self.message_pusher
            .push_to(connection_id, &Notification::RoomList(rooms))
            .await?;
        Ok(())
    }

    /// 公開ルームの一覧（HTTP API 用）
    pub async fn public_rooms(&self) -> Vec<RoomSummary> {
        self.rooms.list_rooms(None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::{CreateRoomInput, test_support::Harness};

    async fn create(h: &Harness, by: &ConnectionId, id: &str, is_private: bool) {
        h.create_room()
            .execute(
                by,
                CreateRoomInput {
                    room_id: Some(id.to_string()),
                    is_private,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    fn listed(h: &Harness, connection_id: &ConnectionId) -> Vec<String> {
        match h.pusher.received(connection_id).pop() {
            Some(Notification::RoomList(rooms)) => {
                rooms.into_iter().map(|r| r.id.into_string()).collect()
            }
            other => panic!("expected room_list, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_private_rooms_are_listed_for_members_only() {
        // テスト項目: 非公開ルームはメンバー（と招待されたユーザー）の一覧にだけ表示される
        // given (前提条件):
        let h = Harness::new();
        let ann = h.identify("ann").await;
        create(&h, &ann, "random", false).await;
        create(&h, &ann, "secret", true).await;
        let bob = h.identify("bob").await;
        let anonymous = h.connect().await;
        h.pusher.clear();

        // when (操作):
        h.get_rooms().execute(&ann).await.unwrap();
        h.get_rooms().execute(&bob).await.unwrap();
        h.get_rooms().execute(&anonymous).await.unwrap();

        // then (期待する結果):
        assert_eq!(listed(&h, &ann), vec!["general", "random", "secret"]);
        assert_eq!(listed(&h, &bob), vec!["general", "random"]);
        assert_eq!(listed(&h, &anonymous), vec!["general", "random"]);
    }

    #[tokio::test]
    async fn test_public_rooms_exclude_private() {
        // テスト項目: HTTP API 向けの一覧には公開ルームだけが含まれる
        let h = Harness::new();
        let ann = h.identify("ann").await;
        create(&h, &ann, "secret", true).await;

        let rooms = h.get_rooms().public_rooms().await;

        let ids: Vec<&str> = rooms.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["general"]);
    }
}
