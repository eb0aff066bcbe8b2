// ── Device domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Reported radio signal of a hotspot unit.
///
/// Parsed case-insensitively: the backend sends `strong`, `Strong` and
/// `STRONG` depending on firmware.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    Weak,
    Medium,
    Strong,
}

/// A discoverable hotspot unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: Option<String>,
    pub mac_address: Option<String>,
    /// `None` when the backend omits it or sends an unknown value.
    pub signal_strength: Option<SignalStrength>,
    pub status: Option<String>,
    pub firmware_version: Option<String>,
}

impl Device {
    /// Display name, falling back to the id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Backend session binding a connected device to scan/configure calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    /// Connection time exactly as the backend reported it.
    pub connected_at: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn signal_strength_is_case_insensitive() {
        assert_eq!("STRONG".parse::<SignalStrength>().unwrap(), SignalStrength::Strong);
        assert_eq!("Medium".parse::<SignalStrength>().unwrap(), SignalStrength::Medium);
        assert_eq!("weak".parse::<SignalStrength>().unwrap(), SignalStrength::Weak);
        assert!("excellent".parse::<SignalStrength>().is_err());
        assert_eq!(SignalStrength::Strong.to_string(), "strong");
    }

    #[test]
    fn label_falls_back_to_id() {
        let device = Device {
            id: "dev9".into(),
            name: None,
            mac_address: None,
            signal_strength: None,
            status: None,
            firmware_version: None,
        };
        assert_eq!(device.label(), "dev9");
    }
}
