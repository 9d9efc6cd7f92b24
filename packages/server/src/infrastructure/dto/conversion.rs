//! Conversions between domain types and DTOs.

use hiroba_shared::time::timestamp_to_rfc3339;

use super::{
    http::{RoomDetailDto, RoomSummaryDto, StatsDto},
    websocket::{ChatMessageDto, DirectMessageDto, RoomInfo, ServerEvent},
};
use crate::domain::{ChatMessage, DirectMessage, Notification, Room, RoomSummary, ServerStats};

impl From<ChatMessage> for ChatMessageDto {
    fn from(message: ChatMessage) -> Self {
        Self {
            sender: message.sender.into_string(),
            content: message.content,
            timestamp: message.timestamp.value(),
            encrypted: message.encrypted,
            room: message.room.into_string(),
        }
    }
}

impl From<DirectMessage> for DirectMessageDto {
    fn from(message: DirectMessage) -> Self {
        Self {
            sender: message.sender.into_string(),
            receiver: message.receiver.into_string(),
            content: message.content,
            timestamp: message.timestamp.value(),
            encrypted: message.encrypted,
        }
    }
}

impl From<RoomSummary> for RoomInfo {
    fn from(room: RoomSummary) -> Self {
        Self {
            id: room.id.into_string(),
            name: room.name,
            description: room.description,
            is_private: room.is_private,
            member_count: room.member_count,
            max_members: room.max_members,
            created_at: room.created_at.value(),
        }
    }
}

impl From<Notification> for ServerEvent {
    fn from(notification: Notification) -> Self {
        match notification {
            Notification::UsernameSet { username } => Self::UsernameSet {
                username: username.into_string(),
            },
            Notification::ReceiveMessage(message) => Self::ReceiveMessage(message.into()),
            Notification::UpdateUserList(usernames) => Self::UpdateUserList {
                usernames: usernames.into_iter().map(|u| u.into_string()).collect(),
            },
            Notification::RoomList(rooms) => Self::RoomList {
                rooms: rooms.into_iter().map(RoomInfo::from).collect(),
            },
            Notification::RoomCreated(room) => Self::RoomCreated { room: room.into() },
            Notification::RoomDeleted { room } => Self::RoomDeleted {
                room: room.into_string(),
            },
            Notification::JoinedRoom { room, history } => Self::JoinedRoom {
                room: room.into(),
                history: history.into_iter().map(ChatMessageDto::from).collect(),
            },
            Notification::LeftRoom { room } => Self::LeftRoom {
                room: room.into_string(),
            },
            Notification::UserJoinedRoom { username, room } => Self::UserJoinedRoom {
                username: username.into_string(),
                room: room.into_string(),
            },
            Notification::UserLeftRoom { username, room } => Self::UserLeftRoom {
                username: username.into_string(),
                room: room.into_string(),
            },
            Notification::PrivateMessage(message) => Self::PrivateMessage(message.into()),
            Notification::PrivateMessageSent(message) => Self::PrivateMessageSent(message.into()),
            Notification::ConversationHistory {
                with_user,
                messages,
            } => Self::ConversationHistory {
                with_user,
                messages: messages.into_iter().map(DirectMessageDto::from).collect(),
            },
            Notification::RoomMembers { room, members } => Self::RoomMembers {
                room: room.into_string(),
                members: members.into_iter().map(|u| u.into_string()).collect(),
            },
            Notification::RoomInvitation { room, invited_by } => Self::RoomInvitation {
                room: room.into_string(),
                invited_by: invited_by.into_string(),
            },
            Notification::Stats(stats) => Self::Stats {
                users_online: stats.users_online,
                connections: stats.connections,
                rooms: stats.rooms,
            },
            Notification::Error { message } => Self::Error { message },
        }
    }
}

impl From<RoomSummary> for RoomSummaryDto {
    fn from(room: RoomSummary) -> Self {
        Self {
            id: room.id.into_string(),
            name: room.name,
            description: room.description,
            member_count: room.member_count,
            max_members: room.max_members,
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&Room> for RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            name: room.name.as_str().to_string(),
            description: room.description.clone(),
            members: room.members().into_iter().map(|u| u.into_string()).collect(),
            max_members: room.max_members,
            history_size: room.history().len(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<ServerStats> for StatsDto {
    fn from(stats: ServerStats) -> Self {
        Self {
            users_online: stats.users_online,
            connections: stats.connections,
            rooms: stats.rooms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewRoom, RoomId, RoomName, Timestamp, Username};

    fn username(name: &str) -> Username {
        Username::parse(name, 32).unwrap()
    }

    fn room(id: &str) -> Room {
        Room::new(
            NewRoom {
                id: RoomId::new(id).unwrap(),
                name: RoomName::parse(id, 50).unwrap(),
                description: "a room".to_string(),
                is_private: false,
                created_by: None,
                max_members: 50,
            },
            Timestamp::new(1672531200123),
        )
    }

    #[test]
    fn test_chat_message_to_dto() {
        // テスト項目: ChatMessage から ChatMessageDto への変換
        // given (前提条件):
        let message = ChatMessage::new(
            username("ann"),
            RoomId::new("general").unwrap(),
            "hi".to_string(),
            Timestamp::new(1000),
            false,
        );

        // when (操作):
        let dto = ChatMessageDto::from(message);

        // then (期待する結果):
        assert_eq!(dto.sender, "ann");
        assert_eq!(dto.room, "general");
        assert_eq!(dto.content, "hi");
        assert_eq!(dto.timestamp, 1000);
        assert!(!dto.encrypted);
    }

    #[test]
    fn test_user_list_notification_keeps_order() {
        // テスト項目: ユーザーリストの順序が変換後も保たれる
        let notification =
            Notification::UpdateUserList(vec![username("zed"), username("ann")]);

        let event = ServerEvent::from(notification);

        assert_eq!(
            event,
            ServerEvent::UpdateUserList {
                usernames: vec!["zed".to_string(), "ann".to_string()]
            }
        );
    }

    #[test]
    fn test_room_detail_uses_rfc3339() {
        // テスト項目: HTTP のルーム詳細は RFC 3339 形式の作成日時を持つ
        // given (前提条件):
        let mut room = room("general");
        room.add_member(username("bob"), Default::default()).unwrap();
        room.add_member(username("ann"), Default::default()).unwrap();

        // when (操作):
        let dto = RoomDetailDto::from(&room);

        // then (期待する結果):
        assert_eq!(dto.id, "general");
        assert_eq!(dto.members, vec!["ann".to_string(), "bob".to_string()]);
        assert_eq!(dto.history_size, 0);
        assert_eq!(dto.created_at, "2023-01-01T00:00:00.123Z");
    }

    #[test]
    fn test_stats_notification() {
        // テスト項目: Stats 通知の変換
        let stats = ServerStats {
            users_online: 2,
            connections: 3,
            rooms: 1,
        };

        assert_eq!(
            ServerEvent::from(Notification::Stats(stats)),
            ServerEvent::Stats {
                users_online: 2,
                connections: 3,
                rooms: 1
            }
        );
        assert_eq!(
            StatsDto::from(stats),
            StatsDto {
                users_online: 2,
                connections: 3,
                rooms: 1
            }
        );
    }
}
