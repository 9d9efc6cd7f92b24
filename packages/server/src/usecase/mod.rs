//! UseCase 層
//!
//! 1 つのクライアントコマンド（または接続イベント）につき 1 つのユースケースがあります。
//! 各ユースケースはリポジトリと `MessagePusher` を trait object として受け取り、
//! 結果を `Notification` として送信します。失敗は `ChatError` として呼び出し元へ返され、
//! UI 層がそれを `error` イベントとしてコマンドの送信者だけに返します。

mod connect_participant;
mod create_room;
mod delete_room;
mod disconnect_participant;
mod error;
mod get_conversation;
mod get_room_detail;
mod get_room_members;
mod get_rooms;
mod get_stats;
mod invite_to_room;
mod join_room;
mod leave_room;
mod private_message;
mod relocate;
mod send_message;
mod sequencer;
mod set_username;

#[cfg(test)]
mod test_support;

pub use connect_participant::ConnectParticipantUseCase;
pub use create_room::{CreateRoomInput, CreateRoomUseCase};
pub use delete_room::DeleteRoomUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::ChatError;
pub use get_conversation::{CONVERSATION_LIMIT, GetConversationUseCase};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_room_members::GetRoomMembersUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use get_stats::GetStatsUseCase;
pub use invite_to_room::InviteToRoomUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use private_message::PrivateMessageUseCase;
pub use relocate::RoomRelocator;
pub use send_message::SendMessageUseCase;
pub use sequencer::RoomSequencer;
pub use set_username::SetUsernameUseCase;

use crate::domain::{ConnectionId, ConnectionRegistry, RoomId, Username};

/// 入力値の上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLimits {
    pub max_message_length: usize,
    pub max_username_length: usize,
    pub max_room_name_length: usize,
    /// `create_room` で指定できるメンバー数の上限
    pub max_room_members: usize,
}

impl Default for ChatLimits {
    fn default() -> Self {
        Self {
            max_message_length: 1000,
            max_username_length: 32,
            max_room_name_length: 50,
            max_room_members: 50,
        }
    }
}

/// ユーザー名を取得済みの接続
#[derive(Debug, Clone)]
pub(crate) struct Identity {
    pub username: Username,
    pub current_room: Option<RoomId>,
}

/// 接続がユーザー名を取得済みであることを確認する
pub(crate) async fn require_identity(
    registry: &dyn ConnectionRegistry,
    connection_id: &ConnectionId,
) -> Result<Identity, ChatError> {
    let session = registry
        .session(connection_id)
        .await
        .ok_or_else(|| ChatError::Internal("connection is not registered".to_string()))?;
    let username = session.username.ok_or(ChatError::NotIdentified)?;

    Ok(Identity {
        username,
        current_room: session.current_room,
    })
}
