//! Service layer.
//!
//! - [`token_generator`]: CSPRNG-backed token, meeting code and
//!   verification code generation.
//! - [`access_policy`]: pure redemption decision function.
//! - [`session_service`]: the session lifecycle controller.

pub mod access_policy;
pub mod session_service;
pub mod token_generator;

pub use session_service::SessionService;
