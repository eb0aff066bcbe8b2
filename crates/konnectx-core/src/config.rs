// ── Runtime onboarding configuration ──
//
// Describes how to reach the backend and how the wizard paces itself.
// Never touches disk: the CLI builds an `OnboardingConfig` from its
// profile and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed staging backends).
    DangerAcceptInvalid,
}

/// Pacing of the simulated authentication phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthPacing {
    /// Percentage points added per tick.
    pub step: u8,
    /// Time between ticks.
    pub interval: Duration,
}

impl Default for AuthPacing {
    fn default() -> Self {
        Self {
            step: 10,
            interval: Duration::from_millis(300),
        }
    }
}

/// Configuration for one onboarding run.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Backend API root (e.g., `https://api.konnectx.com/v1/`).
    pub backend_url: Url,
    /// Bearer token sent with every request.
    pub bearer_token: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// HTTP client timeout.
    pub timeout: Duration,
    /// Upper bound for a single wizard operation, enforced by the runtime
    /// on top of the HTTP timeout.
    pub request_timeout: Duration,
    /// How long a success notice stays up before the phase advances.
    pub display_delay: Duration,
    /// Delay before a session-expired error returns the user to phase 1.
    pub session_expired_delay: Duration,
    /// Delay before an authorization failure redirects to sign-in.
    pub sign_in_redirect_delay: Duration,
    /// Simulated authentication pacing.
    pub auth_pacing: AuthPacing,
}

impl OnboardingConfig {
    /// Build a config with default pacing for the given backend.
    pub fn new(backend_url: Url) -> Self {
        Self {
            backend_url,
            bearer_token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(45),
            display_delay: Duration::from_millis(1500),
            session_expired_delay: Duration::from_millis(2000),
            sign_in_redirect_delay: Duration::from_millis(2000),
            auth_pacing: AuthPacing::default(),
        }
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: SecretString) -> Self {
        self.bearer_token = Some(token);
        self
    }
}
