//! Onboarding logic between `konnectx-api` and the front-ends.
//!
//! - **[`Wizard`]**: the four-phase onboarding controller. State lives in a
//!   [`WizardState`] value changed only by [`reduce`]; the runtime executes
//!   the reducer's [`Effect`]s (backend calls, delays, authentication) on
//!   spawned tasks, each with a timeout and a cancellation token, and
//!   publishes every state through a `tokio::sync::watch` channel.
//!
//! - **Capabilities**: [`OnboardingBackend`] (implemented for
//!   [`konnectx_api::HotspotClient`]), [`IdentityProvider`] and
//!   [`AuthenticationStrategy`] are injected, so the wizard never reads
//!   credentials or talks HTTP directly.
//!
//! - **Domain model** ([`model`]) and **validation** ([`validation`]) shared
//!   with the CLI.

pub mod auth;
pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod identity;
pub mod model;
pub mod validation;
pub mod wizard;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::{AuthContext, AuthenticationStrategy, SimulatedAuthentication};
pub use backend::{OnboardingBackend, build_client};
pub use config::{AuthPacing, OnboardingConfig, TlsVerification};
pub use error::{CoreError, Failure, FailureKind};
pub use identity::{IdentityProvider, StaticIdentity, StoredIdentity, StoredUser};
pub use wizard::{
    Effect, Event, Notice, Phase, SessionRef, Wizard, WizardHandle, WizardOutcome, WizardState,
    reduce,
};

pub use model::{
    Addressing, Device, EncryptionMode, FinalizeForm, NetworkCandidate, NetworkConfiguration,
    NetworkDetails, OnboardingSummary, ScanResult, SecuritySettings, Session, SignalStrength,
    StaticIpConfig,
};
