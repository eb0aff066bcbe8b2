// ── Phase-scoped user notices ──

use serde::Serialize;
use strum::Display;

use crate::error::{Failure, FailureKind};

/// Fixed notice texts.
pub mod messages {
    pub const CONNECTED: &str = "Successfully Connected!";
    pub const NETWORK_CONFIGURED: &str = "Network configured successfully!";
    pub const DEVICES_FAILED: &str = "Failed to load devices. Please try again.";
    pub const DEVICE_UNAVAILABLE: &str =
        "This device is no longer available. Refreshing the device list...";
    pub const CONNECT_FAILED: &str = "Failed to connect to the device. Please try again.";
    pub const SIGN_IN_REQUIRED: &str = "Your session has expired. Redirecting to sign in...";
    pub const SESSION_EXPIRED: &str =
        "Your device session has expired. Returning to device selection...";
    pub const SCAN_FAILED: &str = "Failed to scan for networks. Please try again.";
    pub const INVALID_PASSWORD: &str =
        "Incorrect Wi-Fi password. Please check the password and try again.";
    pub const NETWORK_NOT_FOUND: &str = "This network is no longer visible. Please rescan.";
    pub const OUT_OF_RANGE: &str =
        "The device could not reach the network. It may be out of range.";
    pub const CONFIGURE_FAILED: &str = "Failed to configure the network. Please try again.";
    pub const TIMED_OUT: &str = "The request timed out. Please try again.";
    pub const AUTH_FAILED: &str = "Device authentication failed. Please try again.";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A message rendered inline in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    /// Set for error notices.
    pub kind: Option<FailureKind>,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            kind: None,
            message: message.into(),
        }
    }

    pub fn error(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind: Some(kind),
            message: message.into(),
        }
    }

    /// Error notice using the backend message when there is one.
    pub(crate) fn from_failure(failure: &Failure, fallback: &str) -> Self {
        let message = failure
            .message
            .as_deref()
            .filter(|m| failure.kind == FailureKind::BadRequest && !m.trim().is_empty())
            .unwrap_or(fallback);
        Self::error(failure.kind, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
