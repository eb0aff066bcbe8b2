// ── Completion summary ──

use serde::Serialize;

use super::{Device, EncryptionMode, FinalizeForm, NetworkDetails, SecuritySettings, Session};

/// Security settings as reported in the summary, without the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct SecuritySummary {
    pub encryption: EncryptionMode,
    pub guest_access: bool,
    pub auto_ban: bool,
    pub block_suspicious: bool,
    pub dos_protection: bool,
}

impl From<&SecuritySettings> for SecuritySummary {
    fn from(s: &SecuritySettings) -> Self {
        Self {
            encryption: s.encryption,
            guest_access: s.guest_access,
            auto_ban: s.auto_ban,
            block_suspicious: s.block_suspicious,
            dos_protection: s.dos_protection,
        }
    }
}

/// Everything collected by a finished onboarding run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnboardingSummary {
    pub device: Device,
    pub session: Session,
    pub network: NetworkDetails,
    pub security: SecuritySummary,
    pub finalize: FinalizeForm,
}
