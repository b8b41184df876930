//! Core library for caretab, the client side of a role-based hospital
//! management system.
//!
//! The crate owns the session lifecycle: exchanging credentials for a
//! bearer token, persisting it, resolving it back to an identity at
//! startup, converging login/logout state across concurrently running
//! instances, and answering role-gating queries for navigation guards.
//! Rendering and CRUD screens belong to the consuming shell.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod routes;

pub use api::{ApiClient, ApiError, AuthGateway};
pub use auth::{AuthBus, AuthMessage, Session, SessionState, TokenCell, TokenStore};
pub use config::Config;
pub use models::{Role, User};
pub use routes::{home_route, GuardOutcome, Route, RouteGuard};
