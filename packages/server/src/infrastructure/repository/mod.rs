//! Repository implementations.

pub mod inmemory;

pub use inmemory::{
    InMemoryConnectionRegistry, InMemoryDirectMessageRepository, InMemoryRoomRepository,
    RoomStoreSettings,
};
