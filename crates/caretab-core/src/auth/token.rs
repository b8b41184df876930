//! Access-token handling: local claim inspection and the shared token cell.
//!
//! Tokens are opaque bearer credentials issued by the gateway. We decode
//! the payload segment locally to read the expiry and role claims, but we
//! never verify the signature - the server is the authority, and a stale
//! or forged token simply fails the identity fetch.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Deserialize;
use thiserror::Error;

use crate::models::Role;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token is not a three-segment JWT")]
    Malformed,

    #[error("token payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("token claims did not parse: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Claims embedded in the gateway's access tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Subject - the user's email address.
    pub sub: String,
    /// Role claim. Soft pre-check only; gating uses the fetched identity.
    pub role: Role,
    /// Expiry as unix seconds.
    pub exp: i64,
}

impl TokenClaims {
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }

    /// Expiry instant, if the claim holds a representable timestamp.
    /// Exposed so a host can schedule a proactive re-check; the core
    /// itself only enforces expiry at initialization.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.exp, 0)
    }
}

/// Decode the payload segment of a JWT without verifying the signature.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Shared cell holding the current raw token.
///
/// The API client reads this at request time to attach the bearer header,
/// so there is no hidden default-header state to mutate; the session
/// coordinator is the only writer.
#[derive(Clone, Default)]
pub struct TokenCell(Arc<RwLock<Option<String>>>);

impl TokenCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.0.read().clone()
    }

    pub fn set(&self, token: String) {
        *self.0.write() = Some(token);
    }

    pub fn clear(&self) {
        *self.0.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_token(claims: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(b"test-signature");
        format!("{header}.{payload}.{signature}")
    }

    #[test]
    fn decodes_claims_from_payload_segment() {
        let exp = Utc::now().timestamp() + 1800;
        let token = encode_token(&format!(
            r#"{{"sub":"doc@x.com","role":"doctor","exp":{exp}}}"#
        ));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub, "doc@x.com");
        assert_eq!(claims.role, Role::Doctor);
        assert!(!claims.is_expired());
        assert!(claims.expires_at().unwrap() > Utc::now());
    }

    #[test]
    fn expired_claim_is_detected() {
        let token = encode_token(r#"{"sub":"doc@x.com","role":"doctor","exp":1000}"#);
        assert!(decode_claims(&token).unwrap().is_expired());
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(
            decode_claims("not-a-jwt"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            decode_claims("a.b.c.d"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            decode_claims("aaa.!!!.ccc"),
            Err(TokenError::Encoding(_))
        ));

        let bad_claims = encode_token(r#"{"sub":"doc@x.com"}"#);
        assert!(matches!(
            decode_claims(&bad_claims),
            Err(TokenError::Claims(_))
        ));
    }

    #[test]
    fn token_cell_is_shared_between_clones() {
        let cell = TokenCell::new();
        let view = cell.clone();
        assert_eq!(view.get(), None);

        cell.set("abc".into());
        assert_eq!(view.get(), Some("abc".into()));

        view.clear();
        assert_eq!(cell.get(), None);
    }
}
