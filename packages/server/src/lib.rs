//! Real-time multi-room chat server.
//!
//! Clients connect over WebSocket, claim a username, move between rooms and
//! exchange room messages and encrypted private messages.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

pub use config::ServerConfig;
