// ── Onboarding domain model ──
//
// Canonical types for one onboarding run. Wire records from
// `konnectx-api` are converted into these in `crate::convert`; nothing
// here knows about HTTP.

pub mod device;
pub mod network;
pub mod security;
pub mod summary;

// ── Re-exports ──────────────────────────────────────────────────────

pub use device::{Device, Session, SignalStrength};
pub use network::{
    Addressing, NetworkCandidate, NetworkConfiguration, NetworkDetails, ScanResult,
    StaticIpConfig,
};
pub use security::{EncryptionMode, FinalizeForm, SecuritySettings};
pub use summary::{OnboardingSummary, SecuritySummary};
