use serde::Deserialize;
use thiserror::Error;

/// Fallback shown when the gateway rejects credentials without a usable
/// detail message
const GENERIC_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Maximum length for error response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    CredentialsRejected(String),

    #[error("Unauthorized - token may be expired or revoked")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Error payload shape the gateway uses for rejections.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: String,
}

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data in errors.
    /// Cuts at a char boundary, since the limit is a byte offset and the
    /// body may hold multibyte text (localized gateway messages).
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..cut],
            body.len()
        )
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Map a failed login response to a user-facing rejection, pulling the
    /// server's `detail` text when the body carries one.
    pub fn login_rejection(status: reqwest::StatusCode, body: &str) -> Self {
        if status.is_client_error() {
            let detail = serde_json::from_str::<ErrorDetail>(body)
                .map(|e| e.detail)
                .ok()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| GENERIC_CREDENTIALS_MESSAGE.to_string());
            ApiError::CredentialsRejected(Self::truncate_body(&detail))
        } else {
            Self::from_status(status, body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "no"),
            ApiError::AccessDenied(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn login_rejection_uses_server_detail() {
        let err = ApiError::login_rejection(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Incorrect email or password"}"#,
        );
        assert_eq!(err.to_string(), "Incorrect email or password");
    }

    #[test]
    fn login_rejection_falls_back_to_generic_text() {
        let err = ApiError::login_rejection(StatusCode::UNAUTHORIZED, "not json");
        assert_eq!(err.to_string(), GENERIC_CREDENTIALS_MESSAGE);

        let err = ApiError::login_rejection(StatusCode::UNAUTHORIZED, r#"{"detail": "  "}"#);
        assert_eq!(err.to_string(), GENERIC_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn login_server_errors_are_not_credential_rejections() {
        let err = ApiError::login_rejection(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, ApiError::ServerError(_)));
    }

    #[test]
    fn oversized_bodies_are_truncated() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::NOT_FOUND, &body);
        assert!(err.to_string().contains("truncated, 2000 total bytes"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 200 euro signs = 600 bytes; byte 500 falls mid-character.
        let body = "\u{20AC}".repeat(200);
        let err = ApiError::from_status(StatusCode::NOT_FOUND, &body);
        assert!(err.to_string().contains("truncated, 600 total bytes"));

        let detail = format!(r#"{{"detail": "{}"}}"#, "\u{00E9}".repeat(400));
        let err = ApiError::login_rejection(StatusCode::BAD_REQUEST, &detail);
        assert!(matches!(err, ApiError::CredentialsRejected(_)));
        assert!(err.to_string().contains("truncated, 800 total bytes"));
    }
}
