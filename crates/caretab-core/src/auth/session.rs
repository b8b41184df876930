//! Session coordinator: the single source of truth for "who is logged in".
//!
//! Each UI instance (a browser tab, a desktop window, a CLI invocation)
//! owns one `Session`. Instances attached to the same [`AuthBus`] converge
//! on the same token and identity: a login in one broadcasts the new token
//! to the rest, a logout clears them all.
//!
//! Failure semantics are fail-closed by contract: an expired token, a 401,
//! a network error or an unparsable identity all resolve to
//! `Unauthenticated` silently. The only error surfaced to a caller is a
//! rejected login, which carries the gateway's detail text.

use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::AuthGateway;
use crate::models::{Role, User};

use super::bus::{AuthBus, AuthMessage, BusReceiver, SenderId};
use super::store::TokenStore;
use super::token::{decode_claims, TokenCell};

/// Per-instance authentication state.
///
/// The machine cycles for the lifetime of the instance:
/// `Initializing` resolves to one of the other two, logins and broadcast
/// messages move between them, and nothing is terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Initializing,
    Unauthenticated,
    Authenticated(User),
}

pub struct Session {
    gateway: Arc<dyn AuthGateway>,
    store: TokenStore,
    bus: AuthBus,
    sender_id: SenderId,
    receiver: Mutex<BusReceiver>,
    token: TokenCell,
    state: RwLock<SessionState>,
}

impl Session {
    /// Attach a new coordinator to a bus. The `token` cell must be the
    /// same one the API client reads, so that state changes here are
    /// visible to outgoing requests immediately.
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        store: TokenStore,
        bus: &AuthBus,
        token: TokenCell,
    ) -> Self {
        let (sender_id, receiver) = bus.register();
        Self {
            gateway,
            store,
            bus: bus.clone(),
            sender_id,
            receiver: Mutex::new(receiver),
            token,
            state: RwLock::new(SessionState::Initializing),
        }
    }

    /// Resolve the persisted token into an authenticated identity, or
    /// settle on `Unauthenticated`. Runs once at startup and never
    /// surfaces an error: every failure path is a silent local logout.
    pub async fn initialize(&self) {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "could not read persisted token");
                self.logout_local();
                return;
            }
        };

        let Some(token) = stored else {
            *self.state.write() = SessionState::Unauthenticated;
            return;
        };

        match decode_claims(&token) {
            Ok(claims) if claims.is_expired() => {
                debug!(sub = %claims.sub, "persisted token expired, clearing session");
                self.logout_local();
            }
            Ok(_) => self.adopt_token(token).await,
            Err(e) => {
                warn!(error = %e, "persisted token did not decode, clearing session");
                self.logout_local();
            }
        }
    }

    /// Exchange credentials for a token, then resolve the identity.
    ///
    /// A rejected login is returned to the caller (state untouched); an
    /// identity-fetch failure after a successful token exchange follows
    /// the usual fail-closed path and is not an error here.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let token = self.gateway.login(email, password).await?;

        if let Err(e) = self.store.save(&token) {
            warn!(error = %e, "could not persist token, session will not survive restart");
        }
        self.bus.publish(
            self.sender_id,
            AuthMessage::Login {
                token: token.clone(),
            },
        );
        self.adopt_token(token).await;
        Ok(())
    }

    /// Clear the session everywhere: locally, in durable storage, and in
    /// every other instance on the bus.
    pub fn logout(&self) {
        self.logout_local();
        self.bus.publish(self.sender_id, AuthMessage::Logout);
    }

    /// Current raw token, if any. Synchronous; collaborators that attach
    /// the token manually read it here.
    pub fn token(&self) -> Option<String> {
        self.token.get()
    }

    /// Identity resolution still pending?
    pub fn is_loading(&self) -> bool {
        matches!(*self.state.read(), SessionState::Initializing)
    }

    pub fn current_user(&self) -> Option<User> {
        match &*self.state.read() {
            SessionState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    /// Role for UI gating, from the fetched identity only.
    pub fn role(&self) -> Option<Role> {
        self.current_user().map(|u| u.role)
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Drain and apply pending bus messages. Hosts call this from their
    /// event-loop tick; tests call it to force convergence. Returns the
    /// number of messages applied.
    pub async fn sync(&self) -> usize {
        let mut pending = Vec::new();
        {
            let mut receiver = self.receiver.lock().await;
            while let Some(message) = receiver.try_next() {
                pending.push(message);
            }
        }

        let applied = pending.len();
        for message in pending {
            self.apply(message).await;
        }
        applied
    }

    /// Apply one incoming broadcast. Idempotent: re-applying the current
    /// login or a logout while already unauthenticated changes nothing,
    /// so a bus that loops messages back to the sender is harmless.
    async fn apply(&self, message: AuthMessage) {
        match message {
            AuthMessage::Login { token } => {
                if self.token.get().as_deref() == Some(token.as_str()) {
                    return;
                }
                debug!("adopting token from another session instance");
                self.adopt_token(token).await;
            }
            AuthMessage::Logout => {
                if matches!(*self.state.read(), SessionState::Unauthenticated) {
                    return;
                }
                debug!("logout received from another session instance");
                // In-memory only: the originating instance already cleared
                // the shared durable entry, and we must not re-broadcast.
                self.token.clear();
                *self.state.write() = SessionState::Unauthenticated;
            }
        }
    }

    /// Make `token` the current credential and resolve its identity.
    /// Fail-closed: any fetch failure clears the whole session locally.
    async fn adopt_token(&self, token: String) {
        self.token.set(token);
        match self.gateway.current_user().await {
            Ok(user) => {
                debug!(user_id = user.id, role = %user.role, "identity resolved");
                *self.state.write() = SessionState::Authenticated(user);
            }
            Err(e) => {
                warn!(error = %e, "identity fetch failed, clearing session");
                self.logout_local();
            }
        }
    }

    /// Clear local state and durable storage without broadcasting.
    fn logout_local(&self) {
        self.token.clear();
        *self.state.write() = SessionState::Unauthenticated;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not remove persisted token");
        }
    }
}
