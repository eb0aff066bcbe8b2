// ── Wire → domain conversions ──
//
// Backend timestamps arrive as RFC 3339 strings. The session's connect
// time is kept verbatim. A missing or unparsable scan time becomes "now",
// since it only labels the network list.

use chrono::{DateTime, Utc};
use tracing::debug;

use konnectx_api::models::{
    ConfigureRequest, ConnectResponse, ConnectionType, DeviceRecord, NetworkDetailsRecord,
    NetworkRecord, ScanResponse, StaticConfigBody,
};

use crate::model::{
    Addressing, Device, NetworkCandidate, NetworkConfiguration, NetworkDetails, ScanResult,
    Session, SignalStrength,
};

fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| debug!(value = s, error = %e, "unparsable timestamp"))
            .ok()
    })
    .unwrap_or_else(Utc::now)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<DeviceRecord> for Device {
    fn from(r: DeviceRecord) -> Self {
        Self {
            signal_strength: r
                .signal_strength
                .as_deref()
                .and_then(|s| s.trim().parse::<SignalStrength>().ok()),
            id: r.id,
            name: non_empty(r.name),
            mac_address: non_empty(r.mac_address),
            status: non_empty(r.status),
            firmware_version: non_empty(r.firmware_version),
        }
    }
}

impl From<ConnectResponse> for Session {
    fn from(r: ConnectResponse) -> Self {
        Self {
            connected_at: r.connected_at,
            session_id: r.session_id,
        }
    }
}

impl From<NetworkRecord> for NetworkCandidate {
    fn from(r: NetworkRecord) -> Self {
        Self {
            ssid: r.ssid,
            bssid: non_empty(r.bssid),
            secured: r.secured,
            security_type: non_empty(r.security_type),
            signal_strength: r.signal_strength,
            frequency: non_empty(r.frequency),
            channel: r.channel,
        }
    }
}

impl From<ScanResponse> for ScanResult {
    fn from(r: ScanResponse) -> Self {
        Self {
            scanned_at: parse_timestamp(r.scanned_at.as_deref()),
            networks: r.networks.into_iter().map(NetworkCandidate::from).collect(),
        }
    }
}

impl From<&NetworkConfiguration> for ConfigureRequest {
    fn from(c: &NetworkConfiguration) -> Self {
        let (connection_type, static_config) = match &c.addressing {
            Addressing::Dhcp => (ConnectionType::Dhcp, None),
            Addressing::Static(s) => (
                ConnectionType::Static,
                Some(StaticConfigBody {
                    ip_address: s.ip.trim().to_owned(),
                    subnet_mask: s.subnet_mask.trim().to_owned(),
                    gateway: s.gateway.trim().to_owned(),
                    dns_primary: s.dns_primary.trim().to_owned(),
                    dns_secondary: Some(s.dns_secondary.trim().to_owned())
                        .filter(|d| !d.is_empty()),
                }),
            ),
        };
        Self {
            device_id: c.device_id.clone(),
            session_id: c.session_id.clone(),
            ssid: c.ssid.clone(),
            password: c.password.clone(),
            connection_type,
            static_config,
        }
    }
}

/// Convert a configure response; `ssid` fills in when the backend omits it.
pub fn network_details(record: NetworkDetailsRecord, ssid: &str) -> NetworkDetails {
    NetworkDetails {
        ssid: non_empty(record.ssid).unwrap_or_else(|| ssid.to_owned()),
        ip_address: non_empty(record.ip_address),
        gateway: non_empty(record.gateway),
        connection_type: non_empty(record.connection_type),
        extra: record
            .extra
            .into_iter()
            .map(|(k, v)| {
                let text = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, text)
            })
            .collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::StaticIpConfig;
    use serde_json::json;

    #[test]
    fn device_signal_parses_any_case() {
        let record: DeviceRecord = serde_json::from_value(json!({
            "id": "dev1",
            "name": "Hotspot_A",
            "signal_strength": "STRONG",
            "mac_address": ""
        }))
        .unwrap();
        let device = Device::from(record);
        assert_eq!(device.signal_strength, Some(SignalStrength::Strong));
        assert!(device.mac_address.is_none());
    }

    #[test]
    fn unknown_signal_is_none() {
        let record: DeviceRecord =
            serde_json::from_value(json!({ "id": "dev1", "signal_strength": "excellent" }))
                .unwrap();
        assert!(Device::from(record).signal_strength.is_none());
    }

    #[test]
    fn session_timestamp_is_kept() {
        let session = Session::from(ConnectResponse {
            session_id: "sess-123".into(),
            connected_at: Some("2024-01-01T00:00:00Z".into()),
        });
        assert_eq!(session.session_id, "sess-123");
        assert_eq!(session.connected_at.as_deref(), Some("2024-01-01T00:00:00Z"));

        let session = Session::from(ConnectResponse {
            session_id: "sess-456".into(),
            connected_at: Some("yesterday".into()),
        });
        assert_eq!(session.connected_at.as_deref(), Some("yesterday"));

        let session = Session::from(ConnectResponse {
            session_id: "sess-789".into(),
            connected_at: None,
        });
        assert!(session.connected_at.is_none());
    }

    #[test]
    fn static_configuration_trims_and_drops_empty_secondary_dns() {
        let config = NetworkConfiguration {
            device_id: "dev1".into(),
            session_id: "sess-123".into(),
            ssid: "Office".into(),
            password: "pw".into(),
            addressing: Addressing::Static(StaticIpConfig {
                ip: " 10.0.0.20 ".into(),
                subnet_mask: "255.255.255.0".into(),
                gateway: "10.0.0.1".into(),
                dns_primary: "1.1.1.1".into(),
                dns_secondary: "  ".into(),
            }),
        };
        let req = ConfigureRequest::from(&config);
        assert_eq!(req.connection_type, ConnectionType::Static);
        let body = req.static_config.unwrap();
        assert_eq!(body.ip_address, "10.0.0.20");
        assert!(body.dns_secondary.is_none());
    }

    #[test]
    fn details_fall_back_to_requested_ssid() {
        let record: NetworkDetailsRecord =
            serde_json::from_value(json!({ "ip_address": "192.168.1.50", "lease": 3600 }))
                .unwrap();
        let details = network_details(record, "CafeWifi");
        assert_eq!(details.ssid, "CafeWifi");
        assert_eq!(details.extra, vec![("lease".to_owned(), "3600".to_owned())]);
    }
}
