//! REST API client module for the hospital-management gateway.
//!
//! The gateway issues JWT bearer tokens through its login endpoint and
//! resolves them back to an identity record through `/api/users/me`.
//! Everything else the backend offers is outside the session core.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthGateway};
pub use error::ApiError;
