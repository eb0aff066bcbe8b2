// ── Onboarding wizard ──
//
// Four phases driven by an explicit state value and a pure reducer:
//
//   Devices ──connect──▶ Network ──configure──▶ Security ──valid──▶ Authentication
//
// `reducer` decides, `runtime` performs I/O and feeds results back.

pub mod event;
pub mod notice;
pub mod reducer;
pub mod runtime;
pub mod state;

pub use event::{Delay, Effect, Event, SessionRef};
pub use notice::{Notice, Severity, messages};
pub use reducer::{Transition, reduce};
pub use runtime::{Wizard, WizardHandle, WizardOutcome};
pub use state::{
    AuthStatus, AuthenticationPhase, DevicePhase, DeviceStep, NetworkPhase, NetworkStep, Phase,
    SecurityPhase, WizardState,
};
