//! Secure Interview Access Service Library
//!
//! Issues time-limited, credential-gated interview sessions and decides
//! whether a redemption attempt succeeds, fails recoverably, or
//! permanently invalidates the session.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP middleware
//! - `models` - Data models
//! - `observability` - Metrics definitions
//! - `routes` - Router and application state
//! - `services` - Token generation, access policy, session lifecycle
//! - `store` - Session store abstraction and in-memory implementation

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
pub mod store;
