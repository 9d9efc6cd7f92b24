//! 接続を別のルームへ移動させる共通処理
//!
//! `set_username`（デフォルトルームへの自動参加）、`join_room`、`leave_room` が使います。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, MessagePusher, Notification, RoomId, RoomRepository,
    RoomSummary, Username,
};

use super::{error::ChatError, sequencer::RoomSequencer};

pub struct RoomRelocator {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: Arc<RoomSequencer>,
}

impl RoomRelocator {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: Arc<RoomSequencer>,
    ) -> Self {
        Self {
            registry,
            rooms,
            message_pusher,
            sequencer,
        }
    }

    /// 接続を `target` へ移動し、履歴を `joined_room` で再生する
    ///
    /// 参加できない場合（存在しない・満員・招待制）は状態を変更せずにエラーを返す。
    /// すでに `target` にいる場合は呼び出し元へ `joined_room` を返すだけで、通知は送らない。
    pub async fn relocate(
        &self,
        connection_id: &ConnectionId,
        username: &Username,
        target: &RoomId,
    ) -> Result<RoomSummary, ChatError> {
        self.move_to(connection_id, username, target, None).await
    }

    /// `relocate` と同じだが、参加が確定してから `joined_room` の直前に `announcement` を送る
    ///
    /// 参加に失敗した場合 `announcement` は送られない。
    pub async fn relocate_announcing(
        &self,
        connection_id: &ConnectionId,
        username: &Username,
        target: &RoomId,
        announcement: Notification,
    ) -> Result<RoomSummary, ChatError> {
        self.move_to(connection_id, username, target, Some(announcement))
            .await
    }

    async fn move_to(
        &self,
        connection_id: &ConnectionId,
        username: &Username,
        target: &RoomId,
        announcement: Option<Notification>,
    ) -> Result<RoomSummary, ChatError> {
        let _lane = self.sequencer.acquire(target).await;

        let outcome = self.rooms.join(target, username).await?;
        let previous = match self
            .registry
            .set_current_room(connection_id, target.clone())
            .await
        {
            Ok(previous) => previous,
            Err(e) => {
                if outcome.newly_joined {
                    self.rooms.leave(target, username).await;
                }
                return Err(e.into());
            }
        };

        if previous.as_ref() != Some(target) {
            if let Some(previous) = previous {
                self.depart(username, &previous).await?;
            }

            let others: Vec<ConnectionId> = self
                .registry
                .connections_in_room(target)
                .await
                .into_iter()
                .filter(|id| id != connection_id)
                .collect();
            self.message_pusher
                .broadcast(
                    others,
                    &Notification::UserJoinedRoom {
                        username: username.clone(),
                        room: target.clone(),
                    },
                )
                .await?;
            tracing::info!(%username, room = %target, "joined room");
        }

        if let Some(announcement) = announcement {
            self.message_pusher
                .push_to(connection_id, &announcement)
                .await?;
        }
        self.message_pusher
            .push_to(
                connection_id,
                &Notification::JoinedRoom {
                    room: outcome.room.clone(),
                    history: outcome.history,
                },
            )
            .await?;

        Ok(outcome.room)
    }

    /// ルームから退出し、残ったメンバーへ `user_left_room` を送る
    async fn depart(&self, username: &Username, room: &RoomId) -> Result<(), ChatError> {
        if !self.rooms.leave(room, username).await {
            return Ok(());
        }
        let remaining = self.registry.connections_in_room(room).await;
        self.message_pusher
            .broadcast(
                remaining,
                &Notification::UserLeftRoom {
                    username: username.clone(),
                    room: room.clone(),
                },
            )
            .await?;
        tracing::info!(%username, %room, "left room");
        Ok(())
    }
}
