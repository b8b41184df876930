//! Domain models shared across the session core.

pub mod user;

pub use user::{Role, User};
