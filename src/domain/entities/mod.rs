//! # Domain Entities
//!
//! Core domain entities for the chat dispatch core.
//!
//! - **ChatRoom**: membership snapshot used to decide fan-out targets
//! - **Message**: a persisted chat message
//!
//! Each entity carries its repository trait, implemented in the infrastructure
//! layer, following the dependency inversion principle.

mod message;
mod room;

pub use message::{Message, MessageRepository, NewMessage};
pub use room::{ChatRoom, RoomRepository};
