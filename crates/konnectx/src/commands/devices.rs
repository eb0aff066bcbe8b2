//! Device command handlers.

use tabled::Tabled;

use konnectx_core::{Device, IdentityProvider, OnboardingBackend as _, Session};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Context;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone().unwrap_or_default(),
            mac: d.mac_address.clone().unwrap_or_default(),
            signal: d
                .signal_strength
                .map(|s| s.to_string())
                .unwrap_or_default(),
            status: d.status.clone().unwrap_or_default(),
            firmware: d.firmware_version.clone().unwrap_or_default(),
        }
    }
}

fn session_detail(s: &Session) -> String {
    [
        format!("Session:   {}", s.session_id),
        format!("Connected: {}", s.connected_at.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List => {
            let email = ctx
                .identity
                .current_user_email()
                .ok_or_else(|| CliError::MissingIdentity {
                    field: "email".into(),
                })?;
            tracing::debug!(%email, "listing available devices");
            let devices = ctx.backend.list_devices(&email).await?;

            if devices.is_empty() && global.output == crate::cli::OutputFormat::Table {
                if !global.quiet {
                    eprintln!("No devices available for {email}");
                }
                return Ok(());
            }
            let out = output::render_list(
                global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Connect { device_id } => {
            let user_id =
                ctx.identity
                    .current_user_id()
                    .ok_or_else(|| CliError::MissingIdentity {
                        field: "user id".into(),
                    })?;
            let session = ctx.backend.connect_device(&device_id, &user_id).await?;
            if !global.quiet {
                eprintln!("✓ Connected to {device_id}");
            }
            let out = output::render_single(global.output, &session, session_detail, |s| {
                s.session_id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use konnectx_core::SignalStrength;

    use super::*;

    #[test]
    fn row_fills_missing_fields_with_blanks() {
        let device = Device {
            id: "dev1".into(),
            name: Some("Hotspot_A".into()),
            mac_address: None,
            signal_strength: Some(SignalStrength::Strong),
            status: None,
            firmware_version: None,
        };
        let row = DeviceRow::from(&device);
        assert_eq!(row.name, "Hotspot_A");
        assert_eq!(row.signal, "strong");
        assert!(row.mac.is_empty());
    }
}
