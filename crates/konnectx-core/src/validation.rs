// ── Form validation predicates ──
//
// Pure functions over form contents. The reducer uses them to gate
// connect/configure/continue; front-ends use them to show per-field hints.

use std::net::Ipv4Addr;

use crate::model::{Addressing, NetworkCandidate, SecuritySettings, StaticIpConfig};

/// Minimum length of the phase 3 device password.
pub const MIN_DEVICE_PASSWORD_LEN: usize = 6;

// ── Phase 2 ──────────────────────────────────────────────────────────

/// Static addressing fields, for hint reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StaticField {
    Ip,
    SubnetMask,
    Gateway,
    DnsPrimary,
    DnsSecondary,
}

/// Mandatory static fields that are still empty.
pub fn missing_static_fields(config: &StaticIpConfig) -> Vec<StaticField> {
    [
        (StaticField::Ip, &config.ip),
        (StaticField::SubnetMask, &config.subnet_mask),
        (StaticField::Gateway, &config.gateway),
        (StaticField::DnsPrimary, &config.dns_primary),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect()
}

/// Filled fields that do not parse as dotted-quad IPv4.
///
/// Advisory only: the backend is the authority on address validity.
pub fn malformed_static_fields(config: &StaticIpConfig) -> Vec<StaticField> {
    [
        (StaticField::Ip, &config.ip),
        (StaticField::SubnetMask, &config.subnet_mask),
        (StaticField::Gateway, &config.gateway),
        (StaticField::DnsPrimary, &config.dns_primary),
        (StaticField::DnsSecondary, &config.dns_secondary),
    ]
    .into_iter()
    .filter(|(_, value)| {
        let value = value.trim();
        !value.is_empty() && value.parse::<Ipv4Addr>().is_err()
    })
    .map(|(field, _)| field)
    .collect()
}

/// Whether the addressing choice is complete enough to submit.
pub fn addressing_ready(addressing: &Addressing) -> bool {
    match addressing {
        Addressing::Dhcp => true,
        Addressing::Static(config) => missing_static_fields(config).is_empty(),
    }
}

/// Whether a configure request may be issued for this selection.
///
/// Secured networks need a non-empty password; static addressing needs
/// all four mandatory fields.
pub fn network_ready(
    selected: Option<&NetworkCandidate>,
    password: &str,
    addressing: &Addressing,
) -> bool {
    let Some(network) = selected else {
        return false;
    };
    if network.secured && password.is_empty() {
        return false;
    }
    addressing_ready(addressing)
}

// ── Phase 3 ──────────────────────────────────────────────────────────

/// Outcome of checking the security form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityCheck {
    pub password_too_short: bool,
    pub passwords_mismatch: bool,
}

impl SecurityCheck {
    pub fn is_valid(self) -> bool {
        !self.password_too_short && !self.passwords_mismatch
    }

    /// Per-field hints, in display order.
    pub fn hints(self) -> Vec<String> {
        let mut hints = Vec::new();
        if self.password_too_short {
            hints.push(format!(
                "Password must be at least {MIN_DEVICE_PASSWORD_LEN} characters"
            ));
        }
        if self.passwords_mismatch {
            hints.push("Passwords do not match".to_owned());
        }
        hints
    }
}

/// Check the phase 3 form.
///
/// Length is counted in characters, not bytes.
pub fn check_security(settings: &SecuritySettings) -> SecurityCheck {
    SecurityCheck {
        password_too_short: settings.device_password.chars().count() < MIN_DEVICE_PASSWORD_LEN,
        passwords_mismatch: settings.device_password != settings.confirm_password,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn open(ssid: &str) -> NetworkCandidate {
        NetworkCandidate {
            ssid: ssid.into(),
            bssid: None,
            secured: false,
            security_type: None,
            signal_strength: None,
            frequency: None,
            channel: None,
        }
    }

    fn settings(password: &str, confirm: &str) -> SecuritySettings {
        SecuritySettings {
            device_password: password.into(),
            confirm_password: confirm.into(),
            ..SecuritySettings::default()
        }
    }

    #[test]
    fn secured_network_requires_password() {
        let mut network = open("Office");
        network.secured = true;
        assert!(!network_ready(Some(&network), "", &Addressing::Dhcp));
        assert!(network_ready(Some(&network), "x", &Addressing::Dhcp));
        assert!(network_ready(Some(&open("CafeWifi")), "", &Addressing::Dhcp));
        assert!(!network_ready(None, "x", &Addressing::Dhcp));
    }

    #[test]
    fn static_mode_requires_four_fields() {
        let mut config = StaticIpConfig {
            ip: "10.0.0.20".into(),
            subnet_mask: "255.255.255.0".into(),
            gateway: "10.0.0.1".into(),
            dns_primary: String::new(),
            dns_secondary: String::new(),
        };
        let network = open("CafeWifi");
        assert!(!network_ready(
            Some(&network),
            "",
            &Addressing::Static(config.clone())
        ));
        assert_eq!(missing_static_fields(&config), vec![StaticField::DnsPrimary]);

        config.dns_primary = "1.1.1.1".into();
        assert!(network_ready(Some(&network), "", &Addressing::Static(config)));
    }

    #[test]
    fn malformed_addresses_are_hints_only() {
        let config = StaticIpConfig {
            ip: "10.0.0.300".into(),
            subnet_mask: "255.255.255.0".into(),
            gateway: "gateway".into(),
            dns_primary: "1.1.1.1".into(),
            dns_secondary: String::new(),
        };
        assert_eq!(
            malformed_static_fields(&config),
            vec![StaticField::Ip, StaticField::Gateway]
        );
        assert!(addressing_ready(&Addressing::Static(config)));
    }

    #[test]
    fn security_rules() {
        assert!(!check_security(&settings("secret", "secreT")).is_valid());
        assert!(!check_security(&settings("short", "short")).is_valid());
        assert!(check_security(&settings("secret1", "secret1")).is_valid());
        assert!(check_security(&settings("123456", "123456")).is_valid());

        let check = check_security(&settings("abc", "abd"));
        assert_eq!(check.hints().len(), 2);
    }

    #[test]
    fn length_counts_characters() {
        assert!(check_security(&settings("ñññññ", "ñññññ")).password_too_short);
        assert!(!check_security(&settings("ññññññ", "ññññññ")).password_too_short);
    }
}
