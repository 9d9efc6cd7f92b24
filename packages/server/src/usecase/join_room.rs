//! UseCase: ルームへの参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - ルームの移動（旧ルームからの退出、新ルームへの参加、履歴の再生）
//!
//! ### なぜこのテストが必要か
//! - 参加に失敗した場合に状態が変わらないことを保証する
//! - 同じルームへの再参加で通知が重複しないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：別のルームへの移動
//! - 異常系：存在しないルーム、満員のルーム、招待制ルーム
//! - エッジケース：現在のルームへの再参加

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, RoomId};

use super::{error::ChatError, relocate::RoomRelocator, require_identity};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    relocator: Arc<RoomRelocator>,
}

impl JoinRoomUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>, relocator: Arc<RoomRelocator>) -> Self {
        Self {
            registry,
            relocator,
        }
    }

    pub async fn execute(&self, connection_id: &ConnectionId, room_id: &str) -> Result<(), ChatError> {
        let identity = require_identity(self.registry.as_ref(), connection_id).await?;
        let target = RoomId::new(room_id).map_err(|_| ChatError::NotFound(room_id.to_string()))?;

        self.relocator
            .relocate(connection_id, &identity.username, &target)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatMessage, Notification, PrivateRoomPolicy, RoomRepository, Username};
    use crate::infrastructure::repository::RoomStoreSettings;
    use crate::usecase::{CreateRoomInput, test_support::Harness};

    fn username(name: &str) -> Username {
        Username::parse(name, 32).unwrap()
    }

    fn room(id: &str) -> RoomId {
        RoomId::new(id).unwrap()
    }

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

    #[tokio::test]
    async fn test_join_moves_between_rooms() {
        // テスト項目: 別のルームへ参加すると旧ルームから退出し、双方のメンバーへ通知される
        // given (前提条件):
        let h = Harness::new();
        let ann = h.identify("ann").await;
        let bob = h.identify("bob").await;
        create(&h, &ann, "random", false).await;
        let carol = h.identify_in_room("carol", "random").await;
        h.pusher.clear();

        // when (操作):
        let result = h.join_room().execute(&ann, "random").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(h.current_room(&ann).await, Some(room("random")));
        assert!(!h.rooms.is_member(&Harness::general(), &username("ann")).await.unwrap());
        assert!(h.rooms.is_member(&room("random"), &username("ann")).await.unwrap());
        assert_eq!(
            h.pusher.received(&bob),
            vec![Notification::UserLeftRoom {
                username: username("ann"),
                room: Harness::general(),
            }]
        );
        assert_eq!(
            h.pusher.received(&carol),
            vec![Notification::UserJoinedRoom {
                username: username("ann"),
                room: room("random"),
            }]
        );
        assert_eq!(h.pusher.kinds(&ann), vec!["joined_room"]);
    }

    #[tokio::test]
    async fn test_join_replays_history() {
        // テスト項目: 参加時にルームの履歴が古い順に再生される
        // given (前提条件):
        let h = Harness::new();
        let ann = h.identify("ann").await;
        create(&h, &ann, "random", false).await;
        for n in 0..3 {
            h.rooms
                .append_message(
                    &room("random"),
                    ChatMessage::new(
                        username("ann"),
                        room("random"),
                        format!("m{n}"),
                        crate::domain::Timestamp::new(n),
                        false,
                    ),
                )
                .await
                .unwrap();
        }
        h.pusher.clear();

        // when (操作):
        h.join_room().execute(&ann, "random").await.unwrap();

        // then (期待する結果):
        let received = h.pusher.received(&ann);
        let Notification::JoinedRoom { room: summary, history } = &received[0] else {
            panic!("expected joined_room, got {:?}", received);
        };
        assert_eq!(summary.member_count, 1);
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m1", "m2"]);
    }

    #[tokio::test]
    async fn test_rejoin_current_room_is_silent() {
        // テスト項目: 現在のルームへの再参加は本人への joined_room だけで、他のメンバーには通知されない
        // given (前提条件):
        let h = Harness::new();
        let ann = h.identify("ann").await;
        let bob = h.identify("bob").await;
        h.pusher.clear();

        // when (操作):
        let result = h.join_room().execute(&ann, "general").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(h.pusher.kinds(&ann), vec!["joined_room"]);
        assert!(h.pusher.received(&bob).is_empty());
        assert_eq!(
            h.rooms.members(&Harness::general()).await.unwrap(),
            vec![username("ann"), username("bob")]
        );
    }

    #[tokio::test]
    async fn test_join_unknown_room_keeps_state() {
        // テスト項目: 存在しないルームへの参加は NotFound になり、現在のルームは変わらない
        // given (前提条件):
        let h = Harness::new();
        let ann = h.identify("ann").await;
        let bob = h.identify("bob").await;
        h.pusher.clear();

        // when (操作):
        let result = h.join_room().execute(&ann, "ghost").await;

        // then (期待する結果):
        assert_eq!(result, Err(ChatError::NotFound("ghost".to_string())));
        assert_eq!(h.current_room(&ann).await, Some(Harness::general()));
        assert!(h.rooms.is_member(&Harness::general(), &username("ann")).await.unwrap());
        assert!(h.pusher.received(&ann).is_empty());
        assert!(h.pusher.received(&bob).is_empty());
    }

    #[tokio::test]
    async fn test_join_full_room() {
        // テスト項目: 満員のルームには参加できない
        // given (前提条件):
        let h = Harness::new();
        let ann = h.identify("ann").await;
        h.create_room()
            .execute(
                &ann,
                CreateRoomInput {
                    room_id: Some("duo".to_string()),
                    max_members: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        h.join_room().execute(&ann, "duo").await.unwrap();
        let bob = h.identify("bob").await;

        // when (操作):
        let result = h.join_room().execute(&bob, "duo").await;

        // then (期待する結果):
        assert_eq!(result, Err(ChatError::RoomFull("duo".to_string())));
        assert_eq!(h.current_room(&bob).await, Some(Harness::general()));
    }

    #[tokio::test]
    async fn test_private_room_joinable_by_id_when_unlisted() {
        // テスト項目: 既定の設定では非公開ルームも ID を知っていれば参加できる
        let h = Harness::new();
        let ann = h.identify("ann").await;
        create(&h, &ann, "secret", true).await;
        let bob = h.identify("bob").await;

        let result = h.join_room().execute(&bob, "secret").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invite_only_room_is_forbidden_without_invitation() {
        // テスト項目: 招待制の設定では招待されていないユーザーは非公開ルームに参加できない
        // given (前提条件):
        let h = Harness::with_settings(RoomStoreSettings {
            private_room_policy: PrivateRoomPolicy::InviteOnly,
            ..Default::default()
        });
        let ann = h.identify("ann").await;
        create(&h, &ann, "secret", true).await;
        let bob = h.identify("bob").await;

        // when (操作):
        let creator = h.join_room().execute(&ann, "secret").await;
        let stranger = h.join_room().execute(&bob, "secret").await;

        // then (期待する結果):
        assert!(creator.is_ok());
        assert!(matches!(stranger, Err(ChatError::Forbidden(_))));
        assert_eq!(h.current_room(&bob).await, Some(Harness::general()));
    }
}
