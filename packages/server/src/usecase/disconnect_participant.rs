//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 切断時の後片付け（ユーザー名の解放、全ルームからの削除、通知）
//!
//! ### なぜこのテストが必要か
//! - 切断した接続のユーザー名がユーザー一覧やメンバー集合に残ってはならない
//! - 切断は何度呼ばれても安全でなければならない（送受信タスクのどちらが先に終わっても呼ばれる）
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルームにいるユーザーの切断
//! - エッジケース：ユーザー名未設定の接続の切断、二重の切断
//! - 並行性：切断と参加が同時に起きてもユーザー一覧が最新の状態で終わること

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, MessagePusher, Notification, RoomRepository};

use super::{error::ChatError, sequencer::RoomSequencer};

/// 切断処理のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: Arc<RoomSequencer>,
}

impl DisconnectParticipantUseCase {
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

    /// 切断処理を実行（冪等）
    ///
    /// 1. 送信キューを削除
    /// 2. Registry から削除してユーザー名を解放
    /// 3. 全ルームのメンバー集合から削除
    /// 4. 残りの全接続へ `update_user_list`、退出したルームのメンバーへ `user_left_room`
    pub async fn execute(&self, connection_id: &ConnectionId) -> Result<(), ChatError> {
        self.message_pusher.unregister_client(connection_id).await;

        let Some(departure) = self.registry.unregister(connection_id).await else {
            return Ok(());
        };
        let Some(username) = departure.username else {
            tracing::info!(%connection_id, "anonymous connection closed");
            return Ok(());
        };

        let left_rooms = self.rooms.remove_user_everywhere(&username).await;

        {
            let _presence = self.sequencer.acquire_presence().await;
            let usernames = self.registry.list_usernames().await;
            let everyone = self.registry.all_connections().await;
            self.message_pusher
                .broadcast(everyone, &Notification::UpdateUserList(usernames))
                .await?;
        }

        for room in left_rooms {
            let remaining = self.registry.connections_in_room(&room).await;
            self.message_pusher
                .broadcast(
                    remaining,
                    &Notification::UserLeftRoom {
                        username: username.clone(),
                        room,
                    },
                )
                .await?;
        }

        tracing::info!(%connection_id, %username, "user disconnected");
        Ok(())
    }
}
