//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 各ストアは内部で独自の排他制御を持ち、UseCase 層は契約された操作のみを呼び出します。
//! そのため、ロック方式（Mutex / 単一ライタータスク）を差し替えても UseCase 層は変わりません。

use async_trait::async_trait;

use super::{
    entity::{ChatMessage, Departure, DirectMessage, JoinOutcome, NewRoom, Room, RoomSummary, Session},
    error::{RegistryError, RoomError},
    value_object::{ConnectionId, RoomId, Timestamp, Username},
};

/// Connection Registry trait
///
/// 接続とユーザー名（および現在のルーム）の対応を管理します。
/// ユーザー名の取得は線形化可能で、同名の同時取得はちょうど 1 つだけ成功します。
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 新しい接続を登録（常に成功）
    async fn register(&self, connected_at: Timestamp) -> ConnectionId;

    /// ユーザー名を取得
    async fn claim_username(
        &self,
        connection_id: &ConnectionId,
        name: &str,
    ) -> Result<Username, RegistryError>;

    /// 取得したユーザー名を手放し、接続をユーザー名未設定の状態に戻す
    ///
    /// 現在のルームも解除される。ユーザー名を持っていなかった場合は `None`
    async fn release_username(&self, connection_id: &ConnectionId) -> Option<Username>;

    /// 接続を削除（冪等）。解放されたユーザー名と最後にいたルームを返す
    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Departure>;

    /// 取得順に並んだユーザー名の一覧（スナップショット）
    async fn list_usernames(&self) -> Vec<Username>;

    /// 接続の現在の状態
    async fn session(&self, connection_id: &ConnectionId) -> Option<Session>;

    /// ユーザー名を保持している接続
    async fn connection_of(&self, username: &Username) -> Option<ConnectionId>;

    /// 現在のルームを更新し、以前のルームを返す
    async fn set_current_room(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
    ) -> Result<Option<RoomId>, RegistryError>;

    /// 現在のルームが `room_id` である接続の一覧
    async fn connections_in_room(&self, room_id: &RoomId) -> Vec<ConnectionId>;

    /// 全ての接続（ユーザー名未設定を含む）
    async fn all_connections(&self) -> Vec<ConnectionId>;

    /// 接続数
    async fn count_connections(&self) -> usize;

    /// ユーザー名を取得済みの接続数
    async fn count_identified(&self) -> usize;
}

/// Room Store trait
///
/// ルーム定義・メンバー・メッセージ履歴を管理します。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 常に存在するデフォルトルームの ID
    fn default_room_id(&self) -> RoomId;

    /// ルームを作成
    async fn create_room(&self, new_room: NewRoom) -> Result<RoomSummary, RoomError>;

    /// ルームを取得（スナップショット）
    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RoomError>;

    /// `viewer` に表示されるルームの一覧（ID 順）
    async fn list_rooms(&self, viewer: Option<&Username>) -> Vec<RoomSummary>;

    /// ルームに参加（冪等）。履歴を合わせて返す
    async fn join(&self, room_id: &RoomId, username: &Username) -> Result<JoinOutcome, RoomError>;

    /// ルームから退出（冪等）。メンバーだった場合 true
    async fn leave(&self, room_id: &RoomId, username: &Username) -> bool;

    /// メッセージを履歴に追加（容量を超えた分は古い順に削除）
    async fn append_message(
        &self,
        room_id: &RoomId,
        message: ChatMessage,
    ) -> Result<ChatMessage, RoomError>;

    /// 全てのルームからユーザーを削除し、退出したルームを返す
    async fn remove_user_everywhere(&self, username: &Username) -> Vec<RoomId>;

    /// メンバーかどうか
    async fn is_member(&self, room_id: &RoomId, username: &Username) -> Result<bool, RoomError>;

    /// メンバー一覧
    async fn members(&self, room_id: &RoomId) -> Result<Vec<Username>, RoomError>;

    /// 非公開ルームへ招待
    async fn invite(
        &self,
        room_id: &RoomId,
        inviter: &Username,
        invitee: Username,
    ) -> Result<(), RoomError>;

    /// 空のルームを作成者が削除
    async fn delete_room(&self, room_id: &RoomId, requested_by: &Username)
    -> Result<(), RoomError>;

    /// ルーム数
    async fn count_rooms(&self) -> usize;
}

/// Direct Message Store trait
///
/// 個別メッセージの会話履歴（プロセスの生存期間のみ）を管理します。
#[async_trait]
pub trait DirectMessageRepository: Send + Sync {
    /// 会話にメッセージを記録
    async fn record(&self, message: DirectMessage);

    /// 2 ユーザー間の最新 `limit` 件を古い順に返す
    async fn conversation(
        &self,
        user: &Username,
        other: &Username,
        limit: usize,
    ) -> Vec<DirectMessage>;
}
