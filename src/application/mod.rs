//! Application Layer
//!
//! Orchestration of the dispatch core: message intake, translation
//! correlation, preference writes, the worker handler and the consumer
//! registry. This layer owns flow logic and depends on infrastructure only
//! through trait seams.

pub mod consumers;
pub mod message_flow;
pub mod preferences;
pub mod realtime;
pub mod translation_flow;
pub mod worker;

pub use message_flow::MessageFlow;
pub use preferences::LanguagePreferenceService;
pub use translation_flow::CorrelationTracker;
pub use worker::TranslationWorker;
