//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! - **PgRoomRepository** - room membership snapshots
//! - **PgMessageRepository** - message persistence and room backlog

pub mod message_repository;
pub mod room_repository;

pub use message_repository::PgMessageRepository;
pub use room_repository::PgRoomRepository;
