//! Authentication: token lifecycle, durable storage, and the session
//! coordinator that keeps every UI instance in agreement about who is
//! logged in.
//!
//! - `Session`: per-instance coordinator with cross-instance convergence
//! - `AuthBus`: injectable broadcast channel between instances
//! - `TokenStore`: the single persisted token entry
//! - `token`: local JWT claim inspection and the shared token cell

pub mod bus;
pub mod session;
pub mod store;
pub mod token;

pub use bus::{AuthBus, AuthMessage};
pub use session::{Session, SessionState};
pub use store::TokenStore;
pub use token::{decode_claims, TokenCell, TokenClaims, TokenError};
