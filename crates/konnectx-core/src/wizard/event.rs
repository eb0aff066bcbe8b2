// ── Reducer inputs and outputs ──
//
// Events are user intents and async completions. Effects are requests the
// runtime carries out; their results come back as events.

use crate::auth::AuthContext;
use crate::error::Failure;
use crate::model::{
    Addressing, Device, FinalizeForm, NetworkConfiguration, NetworkDetails, OnboardingSummary,
    ScanResult, SecuritySettings, Session,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // ── Phase 1 ──
    /// Fetch the device list (wizard start, manual retry).
    LoadDevices,
    DevicesLoaded(Vec<Device>),
    DevicesFailed(Failure),
    /// Select a device by id; replaces any previous selection.
    SelectDevice(String),
    Connect,
    Connected(Session),
    ConnectFailed(Failure),

    // ── Phase 2 ──
    /// Manual (re)scan.
    ScanNetworks,
    NetworksScanned(SessionRef, ScanResult),
    ScanFailed(SessionRef, Failure),
    /// Select a network by key; replaces any previous selection.
    SelectNetwork(String),
    SetPassword(String),
    SetAddressing(Addressing),
    Configure,
    Configured(SessionRef, NetworkDetails),
    ConfigureFailed(SessionRef, Failure),

    // ── Phase 3 ──
    EditSecurity(SecuritySettings),
    ContinueToAuthentication,

    // ── Phase 4 ──
    AuthenticationProgress(u8),
    Authenticated,
    AuthenticationFailed(Failure),
    RetryAuthentication,
    EditFinalize(FinalizeForm),
    Finish,

    // ── Navigation ──
    /// A success notice has been shown long enough; advance.
    DisplayDelayElapsed,
    /// The device session is gone; start over from phase 1.
    ReturnToDevices,
    Back,
}

/// The device session a phase 2 request was issued for. Completions
/// carrying a different session are stale and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRef {
    pub device_id: String,
    pub session_id: String,
}

impl SessionRef {
    pub fn new(device_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            session_id: session_id.into(),
        }
    }
}

/// Which configured delay a scheduled event waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    Display,
    SessionExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchDevices,
    ConnectDevice {
        device_id: String,
    },
    ScanNetworks {
        device_id: String,
        session_id: String,
    },
    ConfigureNetwork(NetworkConfiguration),
    Authenticate(AuthContext),
    /// Feed `event` back after a delay.
    Schedule {
        after: Delay,
        event: Event,
    },
    /// Stop the wizard and send the user to sign in, after the redirect delay.
    RedirectToSignIn,
    /// The user finished; stop the wizard.
    Complete(Box<OnboardingSummary>),
}
