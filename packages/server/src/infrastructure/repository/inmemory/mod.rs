//! InMemory 実装
//!
//! 全てのストアはプロセスのメモリ上にのみ存在し、再起動で失われます。

mod connection;
mod direct_message;
mod room;

pub use connection::InMemoryConnectionRegistry;
pub use direct_message::InMemoryDirectMessageRepository;
pub use room::{InMemoryRoomRepository, RoomStoreSettings};
