// ── Core error types ──
//
// User-facing errors from konnectx-core. Consumers never see raw HTTP
// status codes or JSON parse failures: the `From<konnectx_api::Error>`
// impl classifies transport-layer errors by backend error code first and
// HTTP status second.

use serde::Serialize;
use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication errors ────────────────────────────────────────
    #[error("Not signed in: {message}")]
    Unauthorized { message: String },

    #[error("Session expired: {message}")]
    SessionExpired { message: String },

    #[error("Missing identity: no {field} available for the current user")]
    MissingIdentity { field: &'static str },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {message}")]
    NotFound {
        code: Option<String>,
        message: String,
    },

    #[error("Incorrect network password: {message}")]
    InvalidPassword { message: String },

    #[error("Request rejected: {}", message.as_deref().unwrap_or("bad request"))]
    BadRequest {
        code: Option<String>,
        message: Option<String>,
    },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Operation cancelled")]
    Cancelled,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// The backend error code (e.g., "DEVICE_UNAVAILABLE").
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Failure classification ───────────────────────────────────────────

/// The small set of failure classes the wizard reacts to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Session or credentials invalid; leads to a delayed redirect.
    Unauthorized,
    /// Device or network vanished; leads to a refresh or rescan prompt.
    NotFound,
    /// Backend rejected the input; its message is shown verbatim.
    BadRequest,
    /// Wrong Wi-Fi password on configure.
    InvalidPassword,
    /// No answer in time; "out of range" on configure.
    Timeout,
    /// Anything else.
    Network,
}

/// A classified failure, as carried by wizard completion events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    /// Backend error code, upper-cased, if one was supplied.
    pub code: Option<String>,
    /// Backend message, if one was supplied.
    pub message: Option<String>,
}

impl Failure {
    pub fn new(kind: FailureKind) -> Self {
        Self {
            kind,
            code: None,
            message: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Whether the backend code names a vanished device.
    pub fn is_device_gone(&self) -> bool {
        self.kind == FailureKind::NotFound
            && !matches!(self.code.as_deref(), Some("NETWORK_NOT_FOUND"))
    }
}

impl CoreError {
    /// Classify this error for the wizard.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Unauthorized { .. } | Self::SessionExpired { .. } | Self::MissingIdentity { .. } => {
                FailureKind::Unauthorized
            }
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::InvalidPassword { .. } => FailureKind::InvalidPassword,
            Self::BadRequest { .. } => FailureKind::BadRequest,
            Self::Timeout { .. } | Self::Cancelled => FailureKind::Timeout,
            Self::ConnectionFailed { .. }
            | Self::Api { .. }
            | Self::Config { .. }
            | Self::Internal(_) => FailureKind::Network,
        }
    }

    /// Backend error code carried by this error, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::NotFound { code, .. }
            | Self::BadRequest { code, .. }
            | Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Backend-supplied message suitable for showing to the user.
    ///
    /// Only errors that carry a payload message return one; fallbacks are
    /// chosen by the wizard.
    pub fn payload_message(&self) -> Option<&str> {
        match self {
            Self::BadRequest { message, .. } => message.as_deref(),
            Self::NotFound { message, .. } | Self::InvalidPassword { message } => Some(message),
            _ => None,
        }
    }

    /// Convert into the wizard's failure value.
    pub fn to_failure(&self) -> Failure {
        Failure {
            kind: self.failure_kind(),
            code: self.code().map(str::to_ascii_uppercase),
            message: self.payload_message().map(String::from),
        }
    }

    /// Whether this error should send the user back to sign in.
    pub fn is_unauthorized(&self) -> bool {
        self.failure_kind() == FailureKind::Unauthorized
    }
}

impl From<&CoreError> for Failure {
    fn from(err: &CoreError) -> Self {
        err.to_failure()
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<konnectx_api::Error> for CoreError {
    fn from(err: konnectx_api::Error) -> Self {
        if err.is_timeout() {
            return CoreError::Timeout { timeout_secs: 0 };
        }
        let http_status = err.status();
        let code = err.api_error_code().map(String::from);
        match err {
            konnectx_api::Error::Authentication { message } => CoreError::Unauthorized { message },
            konnectx_api::Error::Api {
                status, message, ..
            } => classify_api(status, code, message),
            konnectx_api::Error::Transport(e) if e.is_connect() => CoreError::ConnectionFailed {
                url: e
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "<unknown>".into()),
                reason: e.to_string(),
            },
            konnectx_api::Error::Transport(e) => CoreError::Api {
                message: e.to_string(),
                code: None,
                status: http_status,
            },
            konnectx_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            konnectx_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            konnectx_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

/// Classify a backend rejection: the error code wins, the status decides
/// when the code is absent or unknown.
fn classify_api(status: u16, code: Option<String>, message: String) -> CoreError {
    let normalized = code.as_deref().map(str::to_ascii_uppercase);

    match normalized.as_deref() {
        Some("SESSION_EXPIRED" | "INVALID_SESSION" | "TOKEN_EXPIRED") => {
            return CoreError::SessionExpired { message };
        }
        Some("UNAUTHORIZED") => return CoreError::Unauthorized { message },
        Some("DEVICE_UNAVAILABLE" | "DEVICE_NOT_FOUND" | "NETWORK_NOT_FOUND" | "NOT_FOUND") => {
            return CoreError::NotFound {
                code: normalized,
                message,
            };
        }
        Some("INVALID_PASSWORD" | "WRONG_PASSWORD") => {
            return CoreError::InvalidPassword { message };
        }
        Some("TIMEOUT" | "CONNECTION_TIMEOUT") => return CoreError::Timeout { timeout_secs: 0 },
        _ => {}
    }

    match status {
        401 | 403 => CoreError::Unauthorized { message },
        404 => CoreError::NotFound {
            code: normalized,
            message,
        },
        400 | 422 => CoreError::BadRequest {
            code: normalized,
            message: Some(message).filter(|m| !m.trim().is_empty()),
        },
        408 | 504 => CoreError::Timeout { timeout_secs: 0 },
        _ => CoreError::Api {
            message,
            code: normalized,
            status: Some(status),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn api(status: u16, code: Option<&str>, message: &str) -> CoreError {
        CoreError::from(konnectx_api::Error::Api {
            status,
            code: code.map(String::from),
            message: message.into(),
        })
    }

    #[test]
    fn code_takes_precedence_over_status() {
        let err = api(400, Some("DEVICE_UNAVAILABLE"), "gone");
        assert_eq!(err.failure_kind(), FailureKind::NotFound);
        assert_eq!(err.code(), Some("DEVICE_UNAVAILABLE"));

        let err = api(200, Some("session_expired"), "expired");
        assert!(matches!(err, CoreError::SessionExpired { .. }));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn invalid_password_is_distinct_from_bad_request() {
        let err = api(400, Some("INVALID_PASSWORD"), "Authentication with AP failed");
        assert_eq!(err.failure_kind(), FailureKind::InvalidPassword);

        let err = api(400, Some("SSID_TOO_LONG"), "SSID exceeds 32 bytes");
        assert_eq!(err.failure_kind(), FailureKind::BadRequest);
        assert_eq!(err.payload_message(), Some("SSID exceeds 32 bytes"));
    }

    #[test]
    fn status_fallbacks() {
        assert_eq!(api(401, None, "").failure_kind(), FailureKind::Unauthorized);
        assert_eq!(api(404, None, "x").failure_kind(), FailureKind::NotFound);
        assert_eq!(api(504, None, "x").failure_kind(), FailureKind::Timeout);
        assert_eq!(api(500, None, "x").failure_kind(), FailureKind::Network);
        assert_eq!(api(400, Some("CONNECTION_TIMEOUT"), "x").failure_kind(), FailureKind::Timeout);
    }

    #[test]
    fn blank_bad_request_message_is_dropped() {
        let err = api(422, None, "  ");
        assert_eq!(err.payload_message(), None);
        assert_eq!(err.to_string(), "Request rejected: bad request");
    }

    #[test]
    fn authentication_error_maps_to_unauthorized() {
        let err = CoreError::from(konnectx_api::Error::Authentication {
            message: "expired".into(),
        });
        let failure = err.to_failure();
        assert_eq!(failure.kind, FailureKind::Unauthorized);
        assert!(failure.message.is_none());
    }

    #[test]
    fn device_gone_excludes_network_not_found() {
        let failure = api(404, Some("NETWORK_NOT_FOUND"), "x").to_failure();
        assert!(!failure.is_device_gone());
        let failure = api(404, Some("DEVICE_NOT_FOUND"), "x").to_failure();
        assert!(failure.is_device_gone());
    }
}
