//! Domain event payloads.
//!
//! One struct per broker queue, serialized as the JSON body of the message.
//! Events are facts, not commands: consumers must tolerate duplicate delivery,
//! so every payload carries enough context to be applied idempotently.

use serde::{Deserialize, Serialize};

/// Request for one member's translated rendition of a message.
///
/// Published to `translation_request_queue`; consumed by the translation
/// worker. The correlation id links this request to the eventual result slot
/// and completed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequested {
    pub correlation_id: String,
    pub room_id: i64,
    pub user_id: i64,
    pub message_id: i64,
    pub text: String,
    pub lang: String,
}

/// Outcome of a translation request.
///
/// Published to `translation_completed_queue` by the worker, whether the
/// provider succeeded or the text fell back to the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationCompleted {
    pub correlation_id: String,
    pub room_id: i64,
    pub user_id: i64,
    pub message_id: i64,
    pub translated_text: String,
}

/// A member changed their language preference for a room.
///
/// Published to `language_change_notifications`; the listener re-translates the
/// room backlog for that member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageChanged {
    pub user_id: i64,
    pub room_id: i64,
    pub language_code: String,
}

/// A message was persisted for a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessagePosted {
    pub message_id: i64,
    pub room_id: i64,
    pub sender_id: i64,
    pub content: String,
}

/// A message finished dispatch processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageProcessed {
    pub message_id: i64,
    pub room_id: i64,
}

/// A chat room was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoomCreated {
    pub room_id: i64,
    pub room_name: String,
    pub admin_id: i64,
}

/// A chat room was deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoomDeleted {
    pub room_id: i64,
}

/// A chat room was renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoomRenamed {
    pub room_id: i64,
    pub old_name: String,
    pub new_name: String,
}

/// An admin removed a member from a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRemoved {
    pub room_id: i64,
    pub user_id: i64,
}

/// A member left a room on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberLeft {
    pub room_id: i64,
    pub user_id: i64,
}

/// A user was invited into a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInvited {
    pub user_id: i64,
    pub room_id: i64,
    pub room_name: String,
}
