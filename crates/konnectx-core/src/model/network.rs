// ── Network domain types ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Wi-Fi network found by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCandidate {
    pub ssid: String,
    pub bssid: Option<String>,
    pub secured: bool,
    pub security_type: Option<String>,
    /// dBm, as reported by the device.
    pub signal_strength: Option<i32>,
    pub frequency: Option<String>,
    pub channel: Option<u32>,
}

impl NetworkCandidate {
    /// Selection key: the BSSID when known, else the SSID.
    pub fn key(&self) -> &str {
        self.bssid.as_deref().unwrap_or(&self.ssid)
    }
}

/// Output of a network scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub networks: Vec<NetworkCandidate>,
    pub scanned_at: DateTime<Utc>,
}

/// Static addressing parameters. Fields are kept as typed-in text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticIpConfig {
    pub ip: String,
    pub subnet_mask: String,
    pub gateway: String,
    pub dns_primary: String,
    /// Optional; empty means unset.
    pub dns_secondary: String,
}

/// How the device obtains its address on the joined network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Addressing {
    #[default]
    Dhcp,
    Static(StaticIpConfig),
}

/// What the device reported after joining the network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDetails {
    pub ssid: String,
    pub ip_address: Option<String>,
    pub gateway: Option<String>,
    pub connection_type: Option<String>,
    /// Any further fields the backend returned, rendered as JSON text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<(String, String)>,
}

/// A fully specified configure request, built by the reducer.
#[derive(Clone, PartialEq, Eq)]
pub struct NetworkConfiguration {
    pub device_id: String,
    pub session_id: String,
    pub ssid: String,
    /// Empty for open networks.
    pub password: String,
    pub addressing: Addressing,
}

impl fmt::Debug for NetworkConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfiguration")
            .field("device_id", &self.device_id)
            .field("session_id", &self.session_id)
            .field("ssid", &self.ssid)
            .field("password", &if self.password.is_empty() { "" } else { "****" })
            .field("addressing", &self.addressing)
            .finish()
    }
}
