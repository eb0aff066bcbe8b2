// ── Wizard reducer ──
//
// `reduce` is the only place wizard state changes. It is pure: I/O is
// requested through the returned effects. Events that make no sense in
// the current state return the state untouched with no effects.

use tracing::{debug, info};

use super::event::{Delay, Effect, Event};
use super::notice::{Notice, messages};
use super::state::{
    AuthStatus, AuthenticationPhase, DevicePhase, DeviceStep, NetworkPhase, NetworkStep,
    SecurityPhase, WizardState,
};
use crate::auth::AuthContext;
use crate::error::{Failure, FailureKind};
use crate::model::{
    Device, NetworkConfiguration, OnboardingSummary, SecuritySettings, SecuritySummary, Session,
};

/// Result of one reducer step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: WizardState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(state: WizardState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn with(state: WizardState, effect: Effect) -> Self {
        Self {
            state,
            effects: vec![effect],
        }
    }
}

/// Apply `event` to `state`.
pub fn reduce(state: WizardState, event: Event) -> Transition {
    let before = state.phase();
    let transition = match state {
        WizardState::Devices(phase) => reduce_devices(phase, event),
        WizardState::Network(phase) => reduce_network(*phase, event),
        WizardState::Security(phase) => reduce_security(*phase, event),
        WizardState::Authentication(phase) => reduce_authentication(*phase, event),
    };
    let after = transition.state.phase();
    if before != after {
        info!(from = %before, to = %after, "wizard phase changed");
    }
    transition
}

fn ignored(state: WizardState, event: &Event) -> Transition {
    debug!(phase = %state.phase(), ?event, "event ignored in current state");
    Transition::stay(state)
}

/// Phase 1 `Loading`, keeping the previously selected device id.
fn restart_devices(selected: Option<String>, notice: Option<Notice>) -> Transition {
    Transition::with(
        WizardState::Devices(DevicePhase {
            step: DeviceStep::Loading,
            devices: Vec::new(),
            selected,
            notice,
        }),
        Effect::FetchDevices,
    )
}

fn session_expired_return() -> Effect {
    Effect::Schedule {
        after: Delay::SessionExpired,
        event: Event::ReturnToDevices,
    }
}

// ── Phase 1 ──────────────────────────────────────────────────────────

fn reduce_devices(mut phase: DevicePhase, event: Event) -> Transition {
    match event {
        Event::LoadDevices if phase.can_load() => {
            phase.step = DeviceStep::Loading;
            phase.notice = None;
            Transition::with(WizardState::Devices(phase), Effect::FetchDevices)
        }
        Event::DevicesLoaded(devices) if phase.step == DeviceStep::Loading => {
            debug!(count = devices.len(), "device list replaced");
            phase.devices = devices;
            if phase.selected_device().is_none() {
                phase.selected = None;
            }
            phase.step = DeviceStep::Ready;
            Transition::stay(WizardState::Devices(phase))
        }
        Event::DevicesFailed(failure) if phase.step == DeviceStep::Loading => {
            if failure.kind == FailureKind::Unauthorized {
                phase.step = DeviceStep::SignInRequired;
                phase.notice = Some(Notice::error(failure.kind, messages::SIGN_IN_REQUIRED));
                return Transition::with(WizardState::Devices(phase), Effect::RedirectToSignIn);
            }
            phase.step = if phase.devices.is_empty() {
                DeviceStep::Idle
            } else {
                DeviceStep::Ready
            };
            phase.notice = Some(Notice::from_failure(
                &failure,
                fallback_for(&failure, messages::DEVICES_FAILED),
            ));
            Transition::stay(WizardState::Devices(phase))
        }
        Event::SelectDevice(id)
            if matches!(phase.step, DeviceStep::Ready | DeviceStep::Idle)
                && phase.devices.iter().any(|d| d.id == id) =>
        {
            phase.selected = Some(id);
            Transition::stay(WizardState::Devices(phase))
        }
        Event::Connect if phase.can_connect() => {
            let Some(device_id) = phase.selected.clone() else {
                return Transition::stay(WizardState::Devices(phase));
            };
            phase.step = DeviceStep::Connecting;
            phase.notice = None;
            Transition::with(
                WizardState::Devices(phase),
                Effect::ConnectDevice { device_id },
            )
        }
        Event::Connected(session) if phase.step == DeviceStep::Connecting => {
            debug!(session_id = %session.session_id, "device connected");
            phase.step = DeviceStep::Connected(session);
            phase.notice = Some(Notice::success(messages::CONNECTED));
            Transition::with(
                WizardState::Devices(phase),
                Effect::Schedule {
                    after: Delay::Display,
                    event: Event::DisplayDelayElapsed,
                },
            )
        }
        Event::ConnectFailed(failure) if phase.step == DeviceStep::Connecting => {
            connect_failed(phase, &failure)
        }
        Event::DisplayDelayElapsed => match phase.step {
            DeviceStep::Connected(ref session) => {
                let session = session.clone();
                let Some(device) = phase.selected_device().cloned() else {
                    return Transition::stay(WizardState::Devices(phase));
                };
                enter_network(device, session)
            }
            _ => ignored(WizardState::Devices(phase), &event),
        },
        other => ignored(WizardState::Devices(phase), &other),
    }
}

fn connect_failed(mut phase: DevicePhase, failure: &Failure) -> Transition {
    match failure.kind {
        FailureKind::Unauthorized => {
            phase.step = DeviceStep::SignInRequired;
            phase.notice = Some(Notice::error(failure.kind, messages::SIGN_IN_REQUIRED));
            Transition::with(WizardState::Devices(phase), Effect::RedirectToSignIn)
        }
        FailureKind::NotFound if failure.is_device_gone() => {
            phase.step = DeviceStep::Loading;
            phase.notice = Some(Notice::error(failure.kind, messages::DEVICE_UNAVAILABLE));
            Transition::with(WizardState::Devices(phase), Effect::FetchDevices)
        }
        _ => {
            phase.step = DeviceStep::Ready;
            phase.notice = Some(Notice::from_failure(
                failure,
                fallback_for(failure, messages::CONNECT_FAILED),
            ));
            Transition::stay(WizardState::Devices(phase))
        }
    }
}

fn fallback_for<'a>(failure: &Failure, generic: &'a str) -> &'a str {
    match failure.kind {
        FailureKind::Timeout => messages::TIMED_OUT,
        _ => generic,
    }
}

/// Enter phase 2. The network cache is always empty here, so the scan
/// starts immediately.
fn enter_network(device: Device, session: Session) -> Transition {
    let effect = Effect::ScanNetworks {
        device_id: device.id.clone(),
        session_id: session.session_id.clone(),
    };
    Transition::with(
        WizardState::Network(Box::new(NetworkPhase::new(device, session))),
        effect,
    )
}

// ── Phase 2 ──────────────────────────────────────────────────────────

fn network_state(phase: NetworkPhase) -> WizardState {
    WizardState::Network(Box::new(phase))
}

fn reduce_network(mut phase: NetworkPhase, event: Event) -> Transition {
    match event {
        Event::ScanNetworks if phase.is_editable() => {
            phase.step = NetworkStep::Scanning;
            phase.notice = None;
            let effect = Effect::ScanNetworks {
                device_id: phase.device.id.clone(),
                session_id: phase.session.session_id.clone(),
            };
            Transition::with(network_state(phase), effect)
        }
        Event::NetworksScanned(ref origin, _)
        | Event::ScanFailed(ref origin, _)
        | Event::Configured(ref origin, _)
        | Event::ConfigureFailed(ref origin, _)
            if !phase.owns(origin) =>
        {
            debug!(?origin, "completion for another session dropped");
            Transition::stay(network_state(phase))
        }
        Event::NetworksScanned(_, scan) if phase.step == NetworkStep::Scanning => {
            debug!(count = scan.networks.len(), "network list replaced");
            phase.networks = scan.networks;
            phase.scanned_at = Some(scan.scanned_at);
            if phase.selected_network().is_none() {
                phase.selected = None;
                phase.password.clear();
            }
            phase.step = NetworkStep::Scanned;
            Transition::stay(network_state(phase))
        }
        Event::ScanFailed(_, failure) if phase.step == NetworkStep::Scanning => {
            if failure.kind == FailureKind::Unauthorized {
                phase.step = NetworkStep::SessionExpired;
                phase.notice = Some(Notice::error(failure.kind, messages::SESSION_EXPIRED));
                return Transition::with(network_state(phase), session_expired_return());
            }
            phase.step = NetworkStep::ScanFailed;
            phase.notice = Some(Notice::from_failure(
                &failure,
                fallback_for(&failure, messages::SCAN_FAILED),
            ));
            Transition::stay(network_state(phase))
        }
        Event::SelectNetwork(key)
            if phase.is_editable() && phase.networks.iter().any(|n| n.key() == key) =>
        {
            if phase.selected.as_deref() != Some(key.as_str()) {
                phase.selected = Some(key);
                phase.password.clear();
            }
            Transition::stay(network_state(phase))
        }
        Event::SetPassword(password) if phase.is_editable() => {
            phase.password = password;
            Transition::stay(network_state(phase))
        }
        Event::SetAddressing(addressing) if phase.is_editable() => {
            phase.addressing = addressing;
            Transition::stay(network_state(phase))
        }
        Event::Configure if phase.can_configure() => {
            let Some(network) = phase.selected_network() else {
                return Transition::stay(network_state(phase));
            };
            let config = NetworkConfiguration {
                device_id: phase.device.id.clone(),
                session_id: phase.session.session_id.clone(),
                ssid: network.ssid.clone(),
                password: if network.secured {
                    phase.password.clone()
                } else {
                    String::new()
                },
                addressing: phase.addressing.clone(),
            };
            phase.step = NetworkStep::Configuring;
            phase.notice = None;
            Transition::with(network_state(phase), Effect::ConfigureNetwork(config))
        }
        Event::Configured(_, details) if phase.step == NetworkStep::Configuring => {
            phase.step = NetworkStep::Configured(details);
            phase.notice = Some(Notice::success(messages::NETWORK_CONFIGURED));
            Transition::with(
                network_state(phase),
                Effect::Schedule {
                    after: Delay::Display,
                    event: Event::DisplayDelayElapsed,
                },
            )
        }
        Event::ConfigureFailed(_, failure) if phase.step == NetworkStep::Configuring => {
            configure_failed(phase, &failure)
        }
        Event::DisplayDelayElapsed => match phase.step {
            NetworkStep::Configured(ref details) => {
                let details = details.clone();
                phase.step = NetworkStep::Scanned;
                phase.notice = None;
                Transition::stay(WizardState::Security(Box::new(SecurityPhase {
                    network: phase,
                    details,
                    settings: SecuritySettings::default(),
                })))
            }
            _ => ignored(network_state(phase), &event),
        },
        Event::Back
            if matches!(
                phase.step,
                NetworkStep::Scanning | NetworkStep::Scanned | NetworkStep::ScanFailed
            ) =>
        {
            restart_devices(Some(phase.device.id), None)
        }
        Event::ReturnToDevices => restart_devices(
            Some(phase.device.id),
            Some(Notice::error(FailureKind::Unauthorized, messages::SESSION_EXPIRED)),
        ),
        other => ignored(network_state(phase), &other),
    }
}

fn configure_failed(mut phase: NetworkPhase, failure: &Failure) -> Transition {
    if failure.kind == FailureKind::Unauthorized {
        phase.step = NetworkStep::SessionExpired;
        phase.notice = Some(Notice::error(failure.kind, messages::SESSION_EXPIRED));
        return Transition::with(network_state(phase), session_expired_return());
    }

    let fallback = match failure.kind {
        FailureKind::InvalidPassword => messages::INVALID_PASSWORD,
        FailureKind::NotFound => messages::NETWORK_NOT_FOUND,
        FailureKind::Timeout => messages::OUT_OF_RANGE,
        _ => messages::CONFIGURE_FAILED,
    };
    phase.step = NetworkStep::Scanned;
    phase.notice = Some(Notice::from_failure(failure, fallback));
    Transition::stay(network_state(phase))
}

// ── Phase 3 ──────────────────────────────────────────────────────────

fn reduce_security(mut phase: SecurityPhase, event: Event) -> Transition {
    match event {
        Event::EditSecurity(settings) => {
            phase.settings = settings;
            Transition::stay(WizardState::Security(Box::new(phase)))
        }
        Event::ContinueToAuthentication if phase.can_continue() => {
            let ctx = AuthContext {
                device_id: phase.network.device.id.clone(),
                session_id: phase.network.session.session_id.clone(),
            };
            Transition::with(
                WizardState::Authentication(Box::new(AuthenticationPhase::new(phase))),
                Effect::Authenticate(ctx),
            )
        }
        Event::Back => Transition::stay(network_state(phase.network)),
        Event::ReturnToDevices => restart_devices(
            Some(phase.network.device.id),
            Some(Notice::error(FailureKind::Unauthorized, messages::SESSION_EXPIRED)),
        ),
        other => ignored(WizardState::Security(Box::new(phase)), &other),
    }
}

// ── Phase 4 ──────────────────────────────────────────────────────────

fn auth_state(phase: AuthenticationPhase) -> WizardState {
    WizardState::Authentication(Box::new(phase))
}

fn reduce_authentication(mut phase: AuthenticationPhase, event: Event) -> Transition {
    match event {
        Event::AuthenticationProgress(value) if phase.status == AuthStatus::Authenticating => {
            phase.progress = phase.progress.max(value.min(100));
            Transition::stay(auth_state(phase))
        }
        Event::Authenticated if phase.status == AuthStatus::Authenticating => {
            phase.progress = 100;
            phase.status = AuthStatus::Authenticated;
            Transition::stay(auth_state(phase))
        }
        Event::AuthenticationFailed(failure) if phase.status == AuthStatus::Authenticating => {
            phase.status = AuthStatus::Failed;
            if failure.kind == FailureKind::Unauthorized {
                phase.notice = Some(Notice::error(failure.kind, messages::SESSION_EXPIRED));
                return Transition::with(auth_state(phase), session_expired_return());
            }
            phase.notice = Some(Notice::from_failure(
                &failure,
                fallback_for(&failure, messages::AUTH_FAILED),
            ));
            Transition::stay(auth_state(phase))
        }
        Event::RetryAuthentication
            if phase.status == AuthStatus::Failed && !notice_is_unauthorized(&phase) =>
        {
            let ctx = AuthContext {
                device_id: phase.security.network.device.id.clone(),
                session_id: phase.security.network.session.session_id.clone(),
            };
            phase.progress = 0;
            phase.status = AuthStatus::Authenticating;
            phase.notice = None;
            Transition::with(auth_state(phase), Effect::Authenticate(ctx))
        }
        Event::Back
            if phase.status == AuthStatus::Failed && !notice_is_unauthorized(&phase) =>
        {
            Transition::stay(WizardState::Security(Box::new(phase.security)))
        }
        Event::EditFinalize(form) if phase.status == AuthStatus::Authenticated => {
            phase.finalize = form;
            Transition::stay(auth_state(phase))
        }
        Event::Finish if phase.status == AuthStatus::Authenticated => {
            phase.status = AuthStatus::Finished;
            let summary = summarize(&phase);
            Transition::with(auth_state(phase), Effect::Complete(Box::new(summary)))
        }
        Event::ReturnToDevices => restart_devices(
            Some(phase.security.network.device.id),
            Some(Notice::error(FailureKind::Unauthorized, messages::SESSION_EXPIRED)),
        ),
        other => ignored(auth_state(phase), &other),
    }
}

fn notice_is_unauthorized(phase: &AuthenticationPhase) -> bool {
    phase
        .notice
        .as_ref()
        .is_some_and(|n| n.kind == Some(FailureKind::Unauthorized))
}

fn summarize(phase: &AuthenticationPhase) -> OnboardingSummary {
    let security = &phase.security;
    OnboardingSummary {
        device: security.network.device.clone(),
        session: security.network.session.clone(),
        network: security.details.clone(),
        security: SecuritySummary::from(&security.settings),
        finalize: phase.finalize.clone(),
    }
}
