//! `konnectx setup`: the interactive onboarding wizard.
//!
//! The wizard runtime owns the state. This module watches it, prompts when
//! the current step needs an answer, and sends the answers back as events.
//! Prompts block, so they run on the blocking pool while the runtime keeps
//! ticking.

use std::io::{self, IsTerminal};

use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use strum::IntoEnumIterator;

use konnectx_core::validation;
use konnectx_core::wizard::{AuthStatus, DeviceStep, NetworkStep, Phase, Severity};
use konnectx_core::{
    Addressing, Device, EncryptionMode, Event, FailureKind, FinalizeForm, NetworkCandidate,
    Notice, OnboardingSummary, SecuritySettings, StaticIpConfig, Wizard, WizardHandle,
    WizardOutcome, WizardState,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Context;
use super::config_cmd::prompt_err;
use super::networks::security_label;

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: Context, global: &GlobalOpts) -> Result<(), CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "terminal".into(),
            reason: "setup is interactive; run it from a terminal".into(),
        });
    }

    let Context {
        profile_name,
        backend,
        identity,
        config,
    } = ctx;

    let wizard = Wizard::new(backend, identity, config);
    let handle = wizard.handle();
    let runner = tokio::spawn(wizard.run());

    let mut view = View::new(global.quiet);
    let driven = tokio::select! {
        result = drive(&handle, &mut view) => result,
        _ = tokio::signal::ctrl_c() => Err(CliError::Cancelled),
    };
    handle.cancel();
    view.clear();

    let outcome = runner
        .await
        .map_err(|e| CliError::Internal(format!("wizard task failed: {e}")))?;
    driven?;

    match outcome {
        WizardOutcome::Completed(summary) => {
            output::print_notice(Severity::Success, "Hotspot setup complete");
            let out = output::render_single(global.output, summary.as_ref(), summary_detail, |s| {
                s.device.id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        WizardOutcome::SignInRequired => Err(CliError::SignInRequired {
            profile: profile_name,
        }),
        WizardOutcome::Abandoned => Err(CliError::Cancelled),
    }
}

/// Follow state changes until the wizard stops or the user quits.
async fn drive(handle: &WizardHandle, view: &mut View) -> Result<(), CliError> {
    let mut rx = handle.subscribe();
    // The first published state is the initial device fetch.
    if rx.changed().await.is_err() {
        return Ok(());
    }

    loop {
        let state = rx.borrow_and_update().clone();
        view.render(&state);

        let Some(prompt) = next_prompt(&state) else {
            if rx.changed().await.is_err() {
                break;
            }
            continue;
        };
        let answer = tokio::task::spawn_blocking(move || ask(prompt))
            .await
            .map_err(|e| CliError::Internal(format!("prompt task failed: {e}")))??;

        let Some(events) = answer else {
            handle.cancel();
            break;
        };
        view.answered();
        // Once the answer is applied the latest state is read again, even
        // if it equals the one just answered.
        if !handle.submit(events).await {
            break;
        }
    }
    Ok(())
}

// ── Prompt selection ────────────────────────────────────────────────

/// A question the current state is waiting on.
#[derive(Debug)]
enum Prompt {
    PickDevice(Vec<Device>),
    ReloadDevices,
    PickNetwork(Vec<NetworkCandidate>),
    Rescan,
    Security(SecuritySettings),
    RetryAuthentication,
    Finalize(FinalizeForm),
}

/// The prompt for `state`, or `None` while the wizard is busy or about to
/// redirect on its own.
fn next_prompt(state: &WizardState) -> Option<Prompt> {
    match state {
        WizardState::Devices(p) => match p.step {
            DeviceStep::Ready if !p.devices.is_empty() => {
                Some(Prompt::PickDevice(p.devices.clone()))
            }
            DeviceStep::Ready | DeviceStep::Idle => Some(Prompt::ReloadDevices),
            _ => None,
        },
        WizardState::Network(p) => match p.step {
            NetworkStep::Scanned if !p.networks.is_empty() => {
                Some(Prompt::PickNetwork(p.networks.clone()))
            }
            NetworkStep::Scanned | NetworkStep::ScanFailed => Some(Prompt::Rescan),
            _ => None,
        },
        WizardState::Security(p) => Some(Prompt::Security(p.settings.clone())),
        WizardState::Authentication(p) => match p.status {
            AuthStatus::Failed
                if p.notice
                    .as_ref()
                    .is_none_or(|n| n.kind != Some(FailureKind::Unauthorized)) =>
            {
                Some(Prompt::RetryAuthentication)
            }
            AuthStatus::Authenticated => Some(Prompt::Finalize(p.finalize.clone())),
            _ => None,
        },
    }
}

// ── Prompts (blocking) ──────────────────────────────────────────────

/// Ask `prompt`. `None` means the user chose to quit.
fn ask(prompt: Prompt) -> Result<Option<Vec<Event>>, CliError> {
    match prompt {
        Prompt::PickDevice(devices) => pick_device(&devices),
        Prompt::ReloadDevices => {
            let again = Confirm::new()
                .with_prompt("Search for devices again?")
                .default(true)
                .interact()
                .map_err(prompt_failed)?;
            Ok(again.then(|| vec![Event::LoadDevices]))
        }
        Prompt::PickNetwork(networks) => pick_network(&networks),
        Prompt::Rescan => {
            let items = ["Scan again", "← Back to devices", "✗ Quit"];
            let choice = select("Networks", &items)?;
            Ok(match choice {
                0 => Some(vec![Event::ScanNetworks]),
                1 => Some(vec![Event::Back]),
                _ => None,
            })
        }
        Prompt::Security(settings) => security(settings).map(Some),
        Prompt::RetryAuthentication => {
            let items = [
                "Retry authentication",
                "← Back to security settings",
                "✗ Quit",
            ];
            Ok(match select("Authentication", &items)? {
                0 => Some(vec![Event::RetryAuthentication]),
                1 => Some(vec![Event::Back]),
                _ => None,
            })
        }
        Prompt::Finalize(form) => finalize(form).map(Some),
    }
}

fn prompt_failed(e: dialoguer::Error) -> CliError {
    match e {
        dialoguer::Error::IO(ref io) if io.kind() == io::ErrorKind::Interrupted => {
            CliError::Cancelled
        }
        other => prompt_err(other),
    }
}

fn select<T: ToString>(prompt: &str, items: &[T]) -> Result<usize, CliError> {
    Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
        .map_err(prompt_failed)
}

fn text(prompt: &str, default: Option<&str>, optional: bool) -> Result<String, CliError> {
    let mut input = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(optional);
    if let Some(default) = default.filter(|d| !d.is_empty()) {
        input = input.default(default.to_owned());
    }
    input
        .interact_text()
        .map(|s| s.trim().to_owned())
        .map_err(prompt_failed)
}

fn device_item(d: &Device) -> String {
    let mut item = format!("{} ({})", d.label(), d.id);
    if let Some(signal) = d.signal_strength {
        item.push_str(&format!(" · {signal} signal"));
    }
    if let Some(ref status) = d.status {
        item.push_str(&format!(" · {status}"));
    }
    item
}

fn pick_device(devices: &[Device]) -> Result<Option<Vec<Event>>, CliError> {
    let mut items: Vec<String> = devices.iter().map(device_item).collect();
    items.push("↻ Refresh device list".into());
    items.push("✗ Quit".into());

    let choice = select("Select a device to connect", &items)?;
    Ok(match devices.get(choice) {
        Some(device) => Some(vec![Event::SelectDevice(device.id.clone()), Event::Connect]),
        None if choice == devices.len() => Some(vec![Event::LoadDevices]),
        None => None,
    })
}

fn network_item(n: &NetworkCandidate) -> String {
    let mut item = format!("{} · {}", n.ssid, security_label(n));
    if let Some(dbm) = n.signal_strength {
        item.push_str(&format!(" · {dbm} dBm"));
    }
    if let Some(ref band) = n.frequency {
        item.push_str(&format!(" · {band}"));
    }
    item
}

fn pick_network(networks: &[NetworkCandidate]) -> Result<Option<Vec<Event>>, CliError> {
    let mut items: Vec<String> = networks.iter().map(network_item).collect();
    items.push("↻ Rescan".into());
    items.push("← Back to devices".into());
    items.push("✗ Quit".into());

    let choice = select("Select the Wi-Fi network for this hotspot", &items)?;
    let Some(network) = networks.get(choice) else {
        return Ok(match choice - networks.len() {
            0 => Some(vec![Event::ScanNetworks]),
            1 => Some(vec![Event::Back]),
            _ => None,
        });
    };

    let mut events = vec![Event::SelectNetwork(network.key().to_owned())];
    if network.secured {
        let password = Password::new()
            .with_prompt(format!("Password for {}", network.ssid))
            .interact()
            .map_err(prompt_failed)?;
        events.push(Event::SetPassword(password));
    }

    let addressing = match select("IP addressing", &["DHCP (automatic)", "Static IP"])? {
        0 => Addressing::Dhcp,
        _ => Addressing::Static(static_config()?),
    };
    events.push(Event::SetAddressing(addressing));
    events.push(Event::Configure);
    Ok(Some(events))
}

fn static_config() -> Result<StaticIpConfig, CliError> {
    let config = StaticIpConfig {
        ip: text("IP address", None, false)?,
        subnet_mask: text("Subnet mask", Some("255.255.255.0"), false)?,
        gateway: text("Gateway", None, false)?,
        dns_primary: text("Primary DNS", Some("8.8.8.8"), false)?,
        dns_secondary: text("Secondary DNS (optional)", None, true)?,
    };
    for field in validation::malformed_static_fields(&config) {
        output::print_hint(&format!("{field} does not look like an IPv4 address"));
    }
    Ok(config)
}

fn security(mut settings: SecuritySettings) -> Result<Vec<Event>, CliError> {
    loop {
        settings.device_password = Password::new()
            .with_prompt(format!(
                "Device admin password (at least {} characters)",
                validation::MIN_DEVICE_PASSWORD_LEN
            ))
            .interact()
            .map_err(prompt_failed)?;
        settings.confirm_password = Password::new()
            .with_prompt("Confirm password")
            .interact()
            .map_err(prompt_failed)?;

        let check = validation::check_security(&settings);
        if check.is_valid() {
            break;
        }
        for hint in check.hints() {
            output::print_notice(Severity::Error, &hint);
        }
    }

    let modes: Vec<EncryptionMode> = EncryptionMode::iter().collect();
    let current = modes
        .iter()
        .position(|m| *m == settings.encryption)
        .unwrap_or_default();
    let choice = Select::new()
        .with_prompt("Encryption")
        .items(&modes)
        .default(current)
        .interact()
        .map_err(prompt_failed)?;
    settings.encryption = modes.get(choice).copied().unwrap_or_default();

    settings.guest_access = toggle("Enable guest access?", settings.guest_access)?;
    settings.auto_ban = toggle("Auto-ban abusive clients?", settings.auto_ban)?;
    settings.block_suspicious = toggle("Block suspicious traffic?", settings.block_suspicious)?;
    settings.dos_protection = toggle("Enable DoS protection?", settings.dos_protection)?;

    Ok(vec![
        Event::EditSecurity(settings),
        Event::ContinueToAuthentication,
    ])
}

fn toggle(prompt: &str, default: bool) -> Result<bool, CliError> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(prompt_failed)
}

fn finalize(form: FinalizeForm) -> Result<Vec<Event>, CliError> {
    let form = FinalizeForm {
        hotspot_name: text("Hotspot name", Some(form.hotspot_name.as_str()), false)?,
        location: optional(text("Location (optional)", form.location.as_deref(), true)?),
        organization: optional(text(
            "Organization (optional)",
            form.organization.as_deref(),
            true,
        )?),
    };
    Ok(vec![Event::EditFinalize(form), Event::Finish])
}

fn optional(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

// ── Rendering ───────────────────────────────────────────────────────

/// Status output on stderr, printed only when something changes.
struct View {
    quiet: bool,
    phase: Option<Phase>,
    notice: Option<Notice>,
    activity: Option<&'static str>,
    progress: Option<ProgressBar>,
}

impl View {
    fn new(quiet: bool) -> Self {
        Self {
            quiet,
            phase: None,
            notice: None,
            activity: None,
            progress: None,
        }
    }

    fn render(&mut self, state: &WizardState) {
        let phase = state.phase();
        if self.phase != Some(phase) {
            self.phase = Some(phase);
            if !self.quiet {
                eprintln!("\nStep {}/4 · {phase}", phase.number());
            }
        }

        if state.notice() != self.notice.as_ref() {
            self.notice = state.notice().cloned();
            if let Some(ref notice) = self.notice {
                if notice.is_error() || !self.quiet {
                    output::print_notice(notice.severity, &notice.message);
                }
            }
        }

        let activity = activity(state);
        if activity != self.activity {
            self.activity = activity;
            if let (Some(line), false) = (activity, self.quiet) {
                output::print_hint(line);
            }
        }

        self.update_progress(state);
    }

    /// The user answered; identical notices may legitimately repeat.
    fn answered(&mut self) {
        self.notice = None;
        self.activity = None;
    }

    fn update_progress(&mut self, state: &WizardState) {
        let auth = match state {
            WizardState::Authentication(p) => Some(p),
            _ => None,
        };
        if let Some(p) = auth.filter(|p| p.status == AuthStatus::Authenticating) {
            let quiet = self.quiet;
            let bar = self.progress.get_or_insert_with(|| progress_bar(quiet));
            bar.set_position(u64::from(p.progress));
            return;
        }
        if let Some(bar) = self.progress.take() {
            if auth.is_some_and(|p| p.is_authenticated()) {
                bar.finish_with_message("done");
            } else {
                bar.abandon();
            }
        }
    }

    fn clear(&mut self) {
        if let Some(bar) = self.progress.take() {
            bar.abandon();
        }
    }
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::with_template("{prefix} [{bar:32}] {pos:>3}% {msg}")
        .map(|s| s.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let bar = ProgressBar::new(100).with_style(style);
    bar.set_prefix("Authenticating device");
    bar
}

fn activity(state: &WizardState) -> Option<&'static str> {
    match state {
        WizardState::Devices(p) => match p.step {
            DeviceStep::Loading => Some("Searching for devices..."),
            DeviceStep::Connecting => Some("Connecting to the device..."),
            DeviceStep::Ready if p.devices.is_empty() => {
                Some("No devices found for this account.")
            }
            _ => None,
        },
        WizardState::Network(p) => match p.step {
            NetworkStep::Scanning => Some("Scanning for Wi-Fi networks..."),
            NetworkStep::Configuring => Some("Configuring the network..."),
            NetworkStep::Scanned if p.networks.is_empty() => Some(
                "No networks found. Move the device closer to your router and scan again.",
            ),
            _ => None,
        },
        WizardState::Security(_) | WizardState::Authentication(_) => None,
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn summary_detail(s: &OnboardingSummary) -> String {
    let network = &s.network;
    [
        format!("Device:           {} ({})", s.device.label(), s.device.id),
        format!("Session:          {}", s.session.session_id),
        format!("Network:          {}", network.ssid),
        format!(
            "Connection:       {}",
            network.connection_type.as_deref().unwrap_or("-")
        ),
        format!(
            "IP address:       {}",
            network.ip_address.as_deref().unwrap_or("-")
        ),
        format!("Encryption:       {}", s.security.encryption),
        format!("Guest access:     {}", on_off(s.security.guest_access)),
        format!("Auto-ban:         {}", on_off(s.security.auto_ban)),
        format!("Block suspicious: {}", on_off(s.security.block_suspicious)),
        format!("DoS protection:   {}", on_off(s.security.dos_protection)),
        format!("Hotspot name:     {}", s.finalize.hotspot_name),
        format!(
            "Location:         {}",
            s.finalize.location.as_deref().unwrap_or("-")
        ),
        format!(
            "Organization:     {}",
            s.finalize.organization.as_deref().unwrap_or("-")
        ),
    ]
    .join("\n")
}
