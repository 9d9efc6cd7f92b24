//! UseCase: ルームへの招待

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, MessagePusher, Notification, RoomId, RoomRepository,
    Username,
};

use super::{error::ChatError, require_identity};

/// ルーム招待のユースケース
///
/// 招待できるのはルームのメンバーだけです。招待されたユーザーには `room_invitation` が届き、
/// 招待制の設定でも非公開ルームへ参加できるようになります。
pub struct InviteToRoomUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    max_username_length: usize,
}

impl InviteToRoomUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        max_username_length: usize,
    ) -> Self {
        Self {
            registry,
            rooms,
            message_pusher,
            max_username_length,
        }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: &str,
        username: &str,
    ) -> Result<(), ChatError> {
        let identity = require_identity(self.registry.as_ref(), connection_id).await?;
        let room = RoomId::new(room_id).map_err(|_| ChatError::NotFound(room_id.to_string()))?;
        let invitee = Username::parse(username, self.max_username_length)
            .map_err(|_| ChatError::UserNotFound(username.trim().to_string()))?;
        let invitee_connection = self
            .registry
            .connection_of(&invitee)
            .await
            .ok_or_else(|| ChatError::UserNotFound(invitee.to_string()))?;

        self.rooms
            .invite(&room, &identity.username, invitee.clone())
            .await?;
        tracing::info!(room = %room, inviter = %identity.username, %invitee, "user invited");

        self.message_pusher
            .push_to(
                &invitee_connection,
                &Notification::RoomInvitation {
                    room: room.clone(),
                    invited_by: identity.username,
                },
            )
            .await?;

        let members = self.rooms.members(&room).await?;
        self.message_pusher
            .push_to(connection_id, &Notification::RoomMembers { room, members })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PrivateRoomPolicy;
    use crate::infrastructure::repository::RoomStoreSettings;
    use crate::usecase::{CreateRoomInput, test_support::Harness};

    fn invite_only() -> Harness {
        Harness::with_settings(RoomStoreSettings {
            private_room_policy: PrivateRoomPolicy::InviteOnly,
            ..Default::default()
        })
    }

    async fn private_room(h: &Harness, owner: &ConnectionId) {
        h.create_room()
            .execute(
                owner,
                CreateRoomInput {
                    room_id: Some("secret".to_string()),
                    is_private: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        h.join_room().execute(owner, "secret").await.unwrap();
    }

    #[tokio::test]
    async fn test_invited_user_can_join() {
        // テスト項目: 招待されたユーザーは招待制の非公開ルームに参加でき、招待が通知される
        // given (前提条件):
        let h = invite_only();
        let ann = h.identify("ann").await;
        private_room(&h, &ann).await;
        let bob = h.identify("bob").await;
        h.pusher.clear();

        // when (操作):
        let invited = h.invite_to_room().execute(&ann, "secret", "bob").await;
        let joined = h.join_room().execute(&bob, "secret").await;

        // then (期待する結果):
        assert!(invited.is_ok());
        assert!(joined.is_ok());
        assert_eq!(
            h.pusher.received(&bob)[0],
            Notification::RoomInvitation {
                room: RoomId::new("secret").unwrap(),
                invited_by: Username::parse("ann", 32).unwrap(),
            }
        );
        assert_eq!(h.pusher.kinds(&ann)[0], "room_members");
    }

    #[tokio::test]
    async fn test_non_member_cannot_invite() {
        // テスト項目: メンバーでないユーザーは招待できない
        let h = invite_only();
        let ann = h.identify("ann").await;
        private_room(&h, &ann).await;
        let bob = h.identify("bob").await;
        h.identify("carol").await;

        let result = h.invite_to_room().execute(&bob, "secret", "carol").await;

        assert!(matches!(result, Err(ChatError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_invite_offline_user() {
        // テスト項目: 接続していないユーザーは招待できない
        let h = invite_only();
        let ann = h.identify("ann").await;
        private_room(&h, &ann).await;

        let result = h.invite_to_room().execute(&ann, "secret", "ghost").await;

        assert_eq!(result, Err(ChatError::UserNotFound("ghost".to_string())));
    }
}
