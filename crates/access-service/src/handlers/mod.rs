//! HTTP request handlers for the access service.

pub mod health;
pub mod metrics;
pub mod sessions;

pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use sessions::{create_session, redeem_session, revoke_session};
