// ── Security and finalize forms ──
//
// Collected locally in phases 3 and 4. Nothing here is submitted to the
// backend.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Wi-Fi encryption offered by the hotspot.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum EncryptionMode {
    #[default]
    #[strum(serialize = "WPA3")]
    #[serde(rename = "WPA3")]
    Wpa3,
    #[strum(serialize = "WPA2")]
    #[serde(rename = "WPA2")]
    Wpa2,
    #[strum(serialize = "Open")]
    #[serde(rename = "Open")]
    Open,
}

/// Phase 3 form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct SecuritySettings {
    pub device_password: String,
    pub confirm_password: String,
    pub encryption: EncryptionMode,
    pub guest_access: bool,
    pub auto_ban: bool,
    pub block_suspicious: bool,
    pub dos_protection: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            device_password: String::new(),
            confirm_password: String::new(),
            encryption: EncryptionMode::Wpa3,
            guest_access: false,
            auto_ban: true,
            block_suspicious: true,
            dos_protection: true,
        }
    }
}

impl fmt::Debug for SecuritySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecuritySettings")
            .field("device_password", &"****")
            .field("confirm_password", &"****")
            .field("encryption", &self.encryption)
            .field("guest_access", &self.guest_access)
            .field("auto_ban", &self.auto_ban)
            .field("block_suspicious", &self.block_suspicious)
            .field("dos_protection", &self.dos_protection)
            .finish()
    }
}

/// Phase 4 finalize form. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeForm {
    pub hotspot_name: String,
    pub location: Option<String>,
    pub organization: Option<String>,
}
