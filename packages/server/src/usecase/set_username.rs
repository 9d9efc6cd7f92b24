//! UseCase: ユーザー名の設定
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SetUsernameUseCase::execute() メソッド
//! - ユーザー名の取得とデフォルトルームへの自動参加、各種通知
//!
//! ### なぜこのテストが必要か
//! - 接続中のユーザー名の一意性を保証する入口
//! - 失敗時に他の接続へ何も通知されず、状態が変わらないことを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：ユーザー名の設定と通知の順序
//! - 異常系：重複、空文字、長すぎる名前、予約名、二重設定、デフォルトルームが満員
//! - 並行性：同名の同時取得、同時に参加したユーザー一覧の配信順序

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, MessagePusher, Notification, RoomRepository};

use super::{error::ChatError, relocate::RoomRelocator, sequencer::RoomSequencer};

/// ユーザー名設定のユースケース
pub struct SetUsernameUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    relocator: Arc<RoomRelocator>,
    sequencer: Arc<RoomSequencer>,
}

impl SetUsernameUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        relocator: Arc<RoomRelocator>,
        sequencer: Arc<RoomSequencer>,
    ) -> Self {
        Self {
            registry,
            rooms,
            message_pusher,
            relocator,
            sequencer,
        }
    }

    /// ユーザー名を設定する
    ///
    /// 成功すると呼び出し元へ `username_set`, `joined_room`, `room_list` を、
    /// 全接続へ `update_user_list` を送る。
    /// デフォルトルームに参加できなかった場合はユーザー名を手放し、未設定の状態に戻す。
    pub async fn execute(&self, connection_id: &ConnectionId, name: &str) -> Result<(), ChatError> {
        let username = self.registry.claim_username(connection_id, name).await?;

        let default_room = self.rooms.default_room_id();
        if let Err(e) = self
            .relocator
            .relocate_announcing(
                connection_id,
                &username,
                &default_room,
                Notification::UsernameSet {
                    username: username.clone(),
                },
            )
            .await
        {
            self.rooms.remove_user_everywhere(&username).await;
            self.registry.release_username(connection_id).await;
            tracing::warn!(%connection_id, %username, "username released: {}", e);
            return Err(e);
        }
        tracing::info!(%connection_id, %username, "username claimed");

        let rooms = self.rooms.list_rooms(Some(&username)).await;
        self.message_pusher
            .push_to(connection_id, &Notification::RoomList(rooms))
            .await?;

        let _presence = self.sequencer.acquire_presence().await;
        let usernames = self.registry.list_usernames().await;
        let everyone = self.registry.all_connections().await;
        self.message_pusher
            .broadcast(everyone, &Notification::UpdateUserList(usernames))
            .await?;

        Ok(())
    }
}
