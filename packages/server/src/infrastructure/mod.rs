//! Infrastructure layer: concrete stores, transports, cipher and DTOs.

pub mod crypto;
pub mod dto;
pub mod message_pusher;
pub mod repository;
