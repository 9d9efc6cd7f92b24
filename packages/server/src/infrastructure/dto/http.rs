//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Public room entry of `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub member_count: usize,
    pub max_members: usize,
    /// RFC 3339
    pub created_at: String,
}

/// Response of `GET /api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub members: Vec<String>,
    pub max_members: usize,
    pub history_size: usize,
    /// RFC 3339
    pub created_at: String,
}

/// Response of `GET /api/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDto {
    pub users_online: usize,
    pub connections: usize,
    pub rooms: usize,
}
