//! Value objects of the chat domain.
//!
//! Every value object is validated on construction, so the rest of the
//! domain can rely on its invariants without re-checking raw strings.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Sender tag of server-generated notices. It can never be claimed as a username.
pub const RESERVED_USERNAME: &str = "System";

/// Opaque identity of one live transport connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh connection identity
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A claimed display name.
///
/// Surrounding whitespace is trimmed; comparison is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    /// Validate and build a username.
    ///
    /// # Errors
    ///
    /// * `EmptyUsername` - empty or whitespace-only
    /// * `UsernameTooLong` - more than `max_length` characters after trimming
    /// * `ReservedUsername` - the name of the system sender
    pub fn parse(raw: &str, max_length: usize) -> Result<Self, ValueObjectError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ValueObjectError::EmptyUsername);
        }
        if name.chars().count() > max_length {
            return Err(ValueObjectError::UsernameTooLong { max: max_length });
        }
        if name == RESERVED_USERNAME {
            return Err(ValueObjectError::ReservedUsername(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Room identifier derived from a display name.
///
/// The id is the name lowercased with every whitespace run replaced by `-`,
/// so "Rust  Lovers" and "rust lovers" collide on `rust-lovers`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    /// Derive a room id from raw input (used for lookups).
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValueObjectError> {
        let slug = slugify(raw.as_ref());
        if slug.is_empty() {
            return Err(ValueObjectError::EmptyRoomId);
        }
        Ok(Self(slug))
    }

    /// Derive a room id for a new room, enforcing the name length limit.
    pub fn from_name(raw: &str, max_length: usize) -> Result<Self, ValueObjectError> {
        let id = Self::new(raw)?;
        if id.0.chars().count() > max_length {
            return Err(ValueObjectError::RoomNameTooLong { max: max_length });
        }
        Ok(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn slugify(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Display name of a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomName(String);

impl RoomName {
    pub fn parse(raw: &str, max_length: usize) -> Result<Self, ValueObjectError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ValueObjectError::EmptyRoomName);
        }
        if name.chars().count() > max_length {
            return Err(ValueObjectError::RoomNameTooLong { max: max_length });
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated plaintext of a chat or private message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// # Errors
    ///
    /// * `EmptyMessage` - empty or whitespace-only
    /// * `MessageTooLong` - more than `max_length` characters
    pub fn parse(raw: &str, max_length: usize) -> Result<Self, ValueObjectError> {
        if raw.trim().is_empty() {
            return Err(ValueObjectError::EmptyMessage);
        }
        if raw.chars().count() > max_length {
            return Err(ValueObjectError::MessageTooLong { max: max_length });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
