//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use konnectx_config::ConfigError;
use konnectx_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend at {url}: {reason}")]
    #[diagnostic(
        code(konnectx::connection_failed),
        help(
            "Check the backend URL and your network connection.\n\
             URL: {url}\n\
             Staging backends with self-signed certificates need --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(konnectx::auth_failed),
        help(
            "Sign in again and store the new token with:\n  \
             konnectx config set-token --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("Sign-in required")]
    #[diagnostic(
        code(konnectx::sign_in_required),
        help(
            "The backend rejected the current credentials.\n\
             Store a fresh token with: konnectx config set-token --profile {profile}"
        )
    )]
    SignInRequired { profile: String },

    #[error("No {field} available for the current user")]
    #[diagnostic(
        code(konnectx::missing_identity),
        help(
            "Pass --email / --user-id, set them on the profile with\n  \
             konnectx config set email <address>\n\
             or point `user_file` at the stored user object."
        )
    )]
    MissingIdentity { field: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(konnectx::not_found), help("Run: konnectx {list_command}"))]
    NotFound {
        message: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(konnectx::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(konnectx::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(konnectx::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: konnectx config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(konnectx::no_config),
        help(
            "Create a profile with: konnectx config init\n\
             Expected at: {path}\n\
             Or pass --backend <url>."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(konnectx::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {reason}")]
    #[diagnostic(
        code(konnectx::keyring),
        help("Use `token_env` or a plaintext `token` in the profile instead.")
    )]
    Keyring { reason: String },

    // ── Wizard ───────────────────────────────────────────────────────
    #[error("Onboarding cancelled")]
    #[diagnostic(code(konnectx::cancelled))]
    Cancelled,

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(konnectx::timeout),
        help("Increase timeout with --timeout or check the device's connectivity.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    #[diagnostic(code(konnectx::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(konnectx::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(konnectx::internal))]
    Internal(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::SignInRequired { .. } | Self::MissingIdentity { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Name the active profile in auth help text.
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: name.into(),
                message,
            },
            other => other,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(see `konnectx config profiles`)".into(),
            },
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Keyring(e) => CliError::Keyring {
                reason: e.to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Unauthorized { message } | CoreError::SessionExpired { message } => {
                CliError::AuthFailed {
                    profile: "current".into(),
                    message,
                }
            }

            CoreError::MissingIdentity { field } => CliError::MissingIdentity {
                field: field.into(),
            },

            CoreError::NotFound { code, message } => {
                let list_command = if code.as_deref() == Some("NETWORK_NOT_FOUND") {
                    "networks scan --device <id> --session <sid>"
                } else {
                    "devices list"
                };
                CliError::NotFound {
                    message,
                    list_command: list_command.into(),
                }
            }

            CoreError::InvalidPassword { message } => CliError::ApiError {
                code: "INVALID_PASSWORD".into(),
                message,
            },

            CoreError::BadRequest { code, message } => CliError::ApiError {
                code: code.unwrap_or_else(|| "BAD_REQUEST".into()),
                message: message.unwrap_or_else(|| "request rejected".into()),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Cancelled => CliError::Cancelled,

            CoreError::Api {
                message,
                code,
                status,
            } => CliError::ApiError {
                code: code
                    .or_else(|| status.map(|s| format!("HTTP {s}")))
                    .unwrap_or_else(|| "unknown".into()),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::Unauthorized {
                    message: "expired".into(),
                },
                exit_code::AUTH,
            ),
            (
                CoreError::MissingIdentity { field: "email" },
                exit_code::AUTH,
            ),
            (
                CoreError::NotFound {
                    code: Some("DEVICE_UNAVAILABLE".into()),
                    message: "gone".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (CoreError::Timeout { timeout_secs: 45 }, exit_code::TIMEOUT),
            (
                CoreError::ConnectionFailed {
                    url: "https://api.konnectx.com/v1/".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::InvalidPassword {
                    message: "wrong".into(),
                },
                exit_code::GENERAL,
            ),
        ];
        for (core, code) in cases {
            let label = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), code, "{label}");
        }
    }

    #[test]
    fn network_not_found_points_at_scan() {
        let err = CliError::from(CoreError::NotFound {
            code: Some("NETWORK_NOT_FOUND".into()),
            message: "no such network".into(),
        });
        match err {
            CliError::NotFound { list_command, .. } => {
                assert!(list_command.starts_with("networks scan"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn config_validation_is_a_usage_error() {
        let err = CliError::from(ConfigError::Validation {
            field: "backend".into(),
            reason: "invalid URL".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert_eq!(err.to_string(), "Invalid value for backend: invalid URL");
    }
}
