//! # Polychat Library
//!
//! This crate provides a multi-room chat server with:
//! - A WebSocket endpoint for real-time messaging
//! - Asynchronous per-member message translation over RabbitMQ
//! - PostgreSQL for rooms and messages
//! - Redis for language preferences and translation result slots
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core entities, repository traits and event payloads
//! - **Application Layer**: Flow orchestration, correlation tracking, worker
//!   and consumer handlers
//! - **Infrastructure Layer**: Database, cache, broker and provider clients
//! - **Presentation Layer**: HTTP routes and the WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! polychat/
//! +-- config/         Configuration management
//! +-- domain/         Entities, repository traits, event payloads
//! +-- application/    Flows, correlation tracker, worker, consumers
//! +-- infrastructure/ Database, cache, broker, translator, metrics
//! +-- presentation/   HTTP routes and WebSocket handlers
//! +-- shared/         Common utilities (errors, auth)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Flow orchestration
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
