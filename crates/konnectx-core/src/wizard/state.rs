// ── Wizard state ──
//
// One variant per phase. Later phases carry what earlier phases produced,
// so a network phase without a connected session cannot be built.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, IntoStaticStr};

use super::event::SessionRef;
use super::notice::Notice;
use crate::model::{
    Addressing, Device, FinalizeForm, NetworkCandidate, NetworkDetails, SecuritySettings, Session,
};
use crate::validation;

/// The four ordered phases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, IntoStaticStr,
)]
pub enum Phase {
    #[strum(serialize = "Device Connection")]
    Devices,
    #[strum(serialize = "Network Configuration")]
    Network,
    #[strum(serialize = "Security Setup")]
    Security,
    #[strum(serialize = "Authentication")]
    Authentication,
}

impl Phase {
    /// 1-based position.
    pub fn number(self) -> u8 {
        match self {
            Self::Devices => 1,
            Self::Network => 2,
            Self::Security => 3,
            Self::Authentication => 4,
        }
    }
}

/// Complete wizard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    Devices(DevicePhase),
    Network(Box<NetworkPhase>),
    Security(Box<SecurityPhase>),
    Authentication(Box<AuthenticationPhase>),
}

impl Default for WizardState {
    fn default() -> Self {
        Self::Devices(DevicePhase::default())
    }
}

impl WizardState {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Devices(_) => Phase::Devices,
            Self::Network(_) => Phase::Network,
            Self::Security(_) => Phase::Security,
            Self::Authentication(_) => Phase::Authentication,
        }
    }

    /// The notice shown in the current phase, if any.
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Self::Devices(p) => p.notice.as_ref(),
            Self::Network(p) => p.notice.as_ref(),
            Self::Security(_) => None,
            Self::Authentication(p) => p.notice.as_ref(),
        }
    }
}

// ── Phase 1 ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeviceStep {
    /// Nothing loaded yet, or the last load failed with nothing to show.
    #[default]
    Idle,
    Loading,
    Ready,
    Connecting,
    /// Connect succeeded; waiting out the display delay.
    Connected(Session),
    /// Credentials rejected; a sign-in redirect is pending.
    SignInRequired,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevicePhase {
    pub step: DeviceStep,
    pub devices: Vec<Device>,
    /// Id of the selected device.
    pub selected: Option<String>,
    pub notice: Option<Notice>,
}

impl DevicePhase {
    pub fn selected_device(&self) -> Option<&Device> {
        let id = self.selected.as_deref()?;
        self.devices.iter().find(|d| d.id == id)
    }

    /// Connect is enabled: a listed device is selected and nothing is in flight.
    pub fn can_connect(&self) -> bool {
        self.step == DeviceStep::Ready && self.selected_device().is_some()
    }

    /// The device list may be (re)fetched.
    pub fn can_load(&self) -> bool {
        matches!(self.step, DeviceStep::Idle | DeviceStep::Ready)
    }
}

// ── Phase 2 ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkStep {
    Scanning,
    Scanned,
    ScanFailed,
    Configuring,
    /// Configure succeeded; waiting out the display delay.
    Configured(NetworkDetails),
    /// Session rejected; a return to phase 1 is pending.
    SessionExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPhase {
    pub device: Device,
    pub session: Session,
    pub step: NetworkStep,
    pub networks: Vec<NetworkCandidate>,
    pub scanned_at: Option<DateTime<Utc>>,
    /// Key of the selected network (see [`NetworkCandidate::key`]).
    pub selected: Option<String>,
    pub password: String,
    pub addressing: Addressing,
    pub notice: Option<Notice>,
}

impl NetworkPhase {
    /// Fresh phase 2 for a just-connected device.
    pub fn new(device: Device, session: Session) -> Self {
        Self {
            device,
            session,
            step: NetworkStep::Scanning,
            networks: Vec::new(),
            scanned_at: None,
            selected: None,
            password: String::new(),
            addressing: Addressing::Dhcp,
            notice: None,
        }
    }

    /// `origin` names this phase's device and session.
    pub fn owns(&self, origin: &SessionRef) -> bool {
        origin.device_id == self.device.id && origin.session_id == self.session.session_id
    }

    pub fn selected_network(&self) -> Option<&NetworkCandidate> {
        let key = self.selected.as_deref()?;
        self.networks.iter().find(|n| n.key() == key)
    }

    /// Form fields may be edited and a scan may be requested.
    pub fn is_editable(&self) -> bool {
        matches!(self.step, NetworkStep::Scanned | NetworkStep::ScanFailed)
    }

    /// Configure is enabled: network selected, password present if
    /// secured, static fields complete if static, nothing in flight.
    pub fn can_configure(&self) -> bool {
        self.step == NetworkStep::Scanned
            && validation::network_ready(
                self.selected_network(),
                &self.password,
                &self.addressing,
            )
    }

    /// A scan has completed and found nothing.
    pub fn is_empty_scan(&self) -> bool {
        self.step == NetworkStep::Scanned && self.networks.is_empty()
    }
}

// ── Phase 3 ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityPhase {
    /// Phase 2 as it was left, restored on Back.
    pub network: NetworkPhase,
    pub details: NetworkDetails,
    pub settings: SecuritySettings,
}

impl SecurityPhase {
    pub fn check(&self) -> validation::SecurityCheck {
        validation::check_security(&self.settings)
    }

    pub fn can_continue(&self) -> bool {
        self.check().is_valid()
    }
}

// ── Phase 4 ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    Authenticating,
    Failed,
    /// Finalize form is shown.
    Authenticated,
    /// Finish was pressed.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationPhase {
    /// Phase 3 as it was left, restored on Back after a failure.
    pub security: SecurityPhase,
    pub progress: u8,
    pub status: AuthStatus,
    pub finalize: FinalizeForm,
    pub notice: Option<Notice>,
}

impl AuthenticationPhase {
    pub fn new(security: SecurityPhase) -> Self {
        let finalize = FinalizeForm {
            hotspot_name: security.network.device.label().to_owned(),
            ..FinalizeForm::default()
        };
        Self {
            security,
            progress: 0,
            status: AuthStatus::Authenticating,
            finalize,
            notice: None,
        }
    }

    /// Once true, stays true for the rest of the run.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.status, AuthStatus::Authenticated | AuthStatus::Finished)
    }
}
