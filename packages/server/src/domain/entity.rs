//! Domain entities: rooms, messages and connection sessions.

use std::collections::{BTreeSet, HashSet, VecDeque};

use super::{
    error::RoomError,
    value_object::{ConnectionId, RoomId, RoomName, Timestamp, Username},
};

/// Default capacity of a room's message history
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Default maximum number of members in a room
pub const DEFAULT_MAX_MEMBERS: usize = 50;

/// A message posted to a room. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Username,
    pub room: RoomId,
    /// Plaintext, or ciphertext when `encrypted` is set
    pub content: String,
    pub timestamp: Timestamp,
    pub encrypted: bool,
}

impl ChatMessage {
    pub fn new(
        sender: Username,
        room: RoomId,
        content: String,
        timestamp: Timestamp,
        encrypted: bool,
    ) -> Self {
        Self {
            sender,
            room,
            content,
            timestamp,
            encrypted,
        }
    }
}

/// A private message between two users. Never stored in a room history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectMessage {
    pub sender: Username,
    pub receiver: Username,
    pub content: String,
    pub timestamp: Timestamp,
    pub encrypted: bool,
}

/// How private rooms are discovered and entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrivateRoomPolicy {
    /// Hidden from listings of non-members, but anyone knowing the id may join
    #[default]
    Unlisted,
    /// Hidden from listings, and only the creator and invited users may join
    InviteOnly,
}

/// Parameters of a room to be created
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub id: RoomId,
    pub name: RoomName,
    pub description: String,
    pub is_private: bool,
    /// `None` for rooms created by the server itself
    pub created_by: Option<Username>,
    pub max_members: usize,
}

/// Listing view of a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    pub is_private: bool,
    pub member_count: usize,
    pub max_members: usize,
    pub created_at: Timestamp,
}

/// Result of joining a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub room: RoomSummary,
    /// Bounded history, oldest first, for replay to the joiner
    pub history: Vec<ChatMessage>,
    /// `false` when the user was already a member
    pub newly_joined: bool,
}

/// Registry view of one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub username: Option<Username>,
    pub current_room: Option<RoomId>,
    pub connected_at: Timestamp,
}

/// What a connection left behind when it was unregistered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub username: Option<Username>,
    pub current_room: Option<RoomId>,
}

/// A chat room with its member set and bounded message history
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub name: RoomName,
    pub description: String,
    pub is_private: bool,
    pub created_by: Option<Username>,
    pub created_at: Timestamp,
    pub max_members: usize,
    members: BTreeSet<Username>,
    invited: HashSet<Username>,
    history: VecDeque<ChatMessage>,
    history_capacity: usize,
}

impl Room {
    /// Create a room with the default history capacity
    pub fn new(new_room: NewRoom, created_at: Timestamp) -> Self {
        Self::with_capacity(new_room, created_at, DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a room keeping at most `history_capacity` messages
    pub fn with_capacity(new_room: NewRoom, created_at: Timestamp, history_capacity: usize) -> Self {
        let mut invited = HashSet::new();
        if let Some(creator) = &new_room.created_by {
            invited.insert(creator.clone());
        }

        Self {
            id: new_room.id,
            name: new_room.name,
            description: new_room.description,
            is_private: new_room.is_private,
            created_by: new_room.created_by,
            created_at,
            max_members: new_room.max_members,
            members: BTreeSet::new(),
            invited,
            history: VecDeque::with_capacity(history_capacity),
            history_capacity,
        }
    }

    /// Add a member.
    ///
    /// Returns `Ok(false)` when the user is already a member.
    pub fn add_member(
        &mut self,
        username: Username,
        policy: PrivateRoomPolicy,
    ) -> Result<bool, RoomError> {
        if self.members.contains(&username) {
            return Ok(false);
        }
        if self.is_private
            && policy == PrivateRoomPolicy::InviteOnly
            && !self.invited.contains(&username)
        {
            return Err(RoomError::Forbidden(format!(
                "room '{}' is invite-only",
                self.id
            )));
        }
        if self.members.len() >= self.max_members {
            return Err(RoomError::RoomFull(self.name.as_str().to_string()));
        }

        self.members.insert(username);
        Ok(true)
    }

    /// Remove a member. Returns whether the user was a member.
    pub fn remove_member(&mut self, username: &Username) -> bool {
        self.members.remove(username)
    }

    pub fn is_member(&self, username: &Username) -> bool {
        self.members.contains(username)
    }

    /// Members in name order
    pub fn members(&self) -> Vec<Username> {
        self.members.iter().cloned().collect()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Allow `invitee` to enter an invite-only room. Only members may invite.
    pub fn invite(&mut self, inviter: &Username, invitee: Username) -> Result<(), RoomError> {
        if !self.members.contains(inviter) {
            return Err(RoomError::Forbidden(format!(
                "only members of '{}' can invite",
                self.id
            )));
        }
        self.invited.insert(invitee);
        Ok(())
    }

    /// Whether the room shows up in listings for `viewer`
    pub fn is_visible_to(&self, viewer: Option<&Username>) -> bool {
        if !self.is_private {
            return true;
        }
        viewer.is_some_and(|name| self.members.contains(name) || self.invited.contains(name))
    }

    /// Append a message, evicting the oldest ones beyond the capacity.
    ///
    /// Returns the number of evicted messages.
    pub fn push_message(&mut self, message: ChatMessage) -> usize {
        self.history.push_back(message);

        let mut evicted = 0;
        while self.history.len() > self.history_capacity {
            self.history.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// History in arrival order, oldest first
    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.iter().cloned().collect()
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.as_str().to_string(),
            description: self.description.clone(),
            is_private: self.is_private,
            member_count: self.members.len(),
            max_members: self.max_members,
            created_at: self.created_at,
        }
    }
}
