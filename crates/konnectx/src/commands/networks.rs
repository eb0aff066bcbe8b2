//! Network command handlers.

use tabled::Tabled;

use konnectx_core::{NetworkCandidate, OnboardingBackend as _};

use crate::cli::{GlobalOpts, NetworksArgs, NetworksCommand};
use crate::error::CliError;
use crate::output;

use super::Context;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "BSSID")]
    bssid: String,
    #[tabled(rename = "Security")]
    security: String,
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Band")]
    frequency: String,
    #[tabled(rename = "Ch")]
    channel: String,
}

impl From<&NetworkCandidate> for NetworkRow {
    fn from(n: &NetworkCandidate) -> Self {
        Self {
            ssid: n.ssid.clone(),
            bssid: n.bssid.clone().unwrap_or_default(),
            security: security_label(n),
            signal: n
                .signal_strength
                .map(|s| format!("{s} dBm"))
                .unwrap_or_default(),
            frequency: n.frequency.clone().unwrap_or_default(),
            channel: n.channel.map(|c| c.to_string()).unwrap_or_default(),
        }
    }
}

/// "Open", or the reported security type for secured networks.
pub(crate) fn security_label(n: &NetworkCandidate) -> String {
    if n.secured {
        n.security_type.clone().unwrap_or_else(|| "Secured".into())
    } else {
        "Open".into()
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    ctx: &Context,
    args: NetworksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NetworksCommand::Scan { device, session } => {
            let scan = ctx.backend.scan_networks(&device, &session).await?;
            if scan.networks.is_empty() && global.output == crate::cli::OutputFormat::Table {
                if !global.quiet {
                    eprintln!("No networks found. Move the device closer and scan again.");
                }
                return Ok(());
            }
            let out = output::render_list(
                global.output,
                &scan.networks,
                |n| NetworkRow::from(n),
                |n| n.ssid.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(secured: bool, security_type: Option<&str>) -> NetworkCandidate {
        NetworkCandidate {
            ssid: "CafeWifi".into(),
            bssid: None,
            secured,
            security_type: security_type.map(Into::into),
            signal_strength: Some(-60),
            frequency: Some("2.4GHz".into()),
            channel: Some(6),
        }
    }

    #[test]
    fn security_label_reflects_secured_flag() {
        assert_eq!(security_label(&candidate(false, Some("WPA2"))), "Open");
        assert_eq!(security_label(&candidate(true, Some("WPA2"))), "WPA2");
        assert_eq!(security_label(&candidate(true, None)), "Secured");
    }

    #[test]
    fn row_formats_signal_and_channel() {
        let row = NetworkRow::from(&candidate(false, None));
        assert_eq!(row.signal, "-60 dBm");
        assert_eq!(row.channel, "6");
    }
}
