// Backend wire types
//
// Every endpoint answers with `{ success, data, error }`. Payload fields use
// `#[serde(default)]` liberally: device inventory records in particular are
// sparse, and numeric fields arrive as strings on some firmware builds.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard backend response envelope.
///
/// ```json
/// { "success": true, "data": { ... } }
/// { "success": false, "error": { "code": "DEVICE_UNAVAILABLE", "message": "..." } }
/// ```
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ErrorField>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error-only view of an envelope, used for non-2xx bodies whose `data`
/// shape is unknown.
#[derive(Debug, Default, Deserialize)]
pub struct FailureEnvelope {
    #[serde(default)]
    pub error: Option<ErrorField>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The `error` member comes either as `{ code, message }` or as a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorField {
    Detailed {
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
    Plain(String),
}

impl ErrorField {
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Detailed { code, .. } => code.as_deref(),
            Self::Plain(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Detailed { message, .. } => message.as_deref(),
            Self::Plain(msg) => Some(msg),
        }
    }
}

// ── Devices ──────────────────────────────────────────────────────────

/// `data` of `GET devices/available`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceList {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}

/// A discoverable hotspot unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    /// `weak` / `medium` / `strong`, casing varies.
    #[serde(default)]
    pub signal_strength: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub firmware_version: Option<String>,
}

/// Body of `POST devices/connect`.
#[derive(Debug, Serialize)]
pub struct ConnectRequest<'a> {
    pub device_id: &'a str,
    pub user_id: &'a str,
}

/// `data` of `POST devices/connect`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectResponse {
    pub session_id: String,
    /// RFC 3339 timestamp, kept verbatim.
    #[serde(default)]
    pub connected_at: Option<String>,
}

// ── Networks ─────────────────────────────────────────────────────────

/// `data` of `GET networks/scan`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanResponse {
    #[serde(default)]
    pub networks: Vec<NetworkRecord>,
    #[serde(default)]
    pub scanned_at: Option<String>,
}

/// A Wi-Fi network visible to the connected device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub ssid: String,
    #[serde(default)]
    pub bssid: Option<String>,
    #[serde(default)]
    pub secured: bool,
    #[serde(default)]
    pub security_type: Option<String>,
    #[serde(default, deserialize_with = "opt_i32_lenient")]
    pub signal_strength: Option<i32>,
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "opt_u32_lenient")]
    pub channel: Option<u32>,
}

/// How the device obtains its address on the joined network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Dhcp,
    Static,
}

/// `static_config` member of the configure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticConfigBody {
    pub ip_address: String,
    pub subnet_mask: String,
    pub gateway: String,
    pub dns_primary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_secondary: Option<String>,
}

/// Body of `POST networks/configure`.
#[derive(Clone, Serialize)]
pub struct ConfigureRequest {
    pub device_id: String,
    pub session_id: String,
    pub ssid: String,
    /// Empty for open networks.
    pub password: String,
    pub connection_type: ConnectionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_config: Option<StaticConfigBody>,
}

impl fmt::Debug for ConfigureRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigureRequest")
            .field("device_id", &self.device_id)
            .field("session_id", &self.session_id)
            .field("ssid", &self.ssid)
            .field("password", &if self.password.is_empty() { "" } else { "****" })
            .field("connection_type", &self.connection_type)
            .field("static_config", &self.static_config)
            .finish()
    }
}

/// `data` of `POST networks/configure`.
///
/// The backend echoes back whatever the device reported after joining;
/// only the common fields are modelled, the rest lands in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkDetailsRecord {
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub connection_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Lenient field helpers ────────────────────────────────────────────

fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn opt_string_lenient<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(de)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn opt_i64_lenient<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(de)? {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn opt_i32_lenient<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i32>, D::Error> {
    Ok(opt_i64_lenient(de)?.and_then(|v| i32::try_from(v).ok()))
}

fn opt_u32_lenient<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u32>, D::Error> {
    Ok(opt_i64_lenient(de)?.and_then(|v| u32::try_from(v).ok()))
}
