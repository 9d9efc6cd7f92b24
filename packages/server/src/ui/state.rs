//! Server state shared by all handlers.

use std::sync::Arc;

use crate::{
    domain::MessagePusher,
    usecase::{
        ConnectParticipantUseCase, CreateRoomUseCase, DeleteRoomUseCase,
        DisconnectParticipantUseCase, GetConversationUseCase, GetRoomDetailUseCase,
        GetRoomMembersUseCase, GetRoomsUseCase, GetStatsUseCase, InviteToRoomUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, PrivateMessageUseCase, SendMessageUseCase,
        SetUsernameUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// `error` イベントの送信に使う
    pub message_pusher: Arc<dyn MessagePusher>,
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub set_username_usecase: Arc<SetUsernameUseCase>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub private_message_usecase: Arc<PrivateMessageUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    pub get_room_members_usecase: Arc<GetRoomMembersUseCase>,
    pub get_conversation_usecase: Arc<GetConversationUseCase>,
    pub invite_to_room_usecase: Arc<InviteToRoomUseCase>,
    pub delete_room_usecase: Arc<DeleteRoomUseCase>,
    pub get_stats_usecase: Arc<GetStatsUseCase>,
}
