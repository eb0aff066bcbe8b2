//! Clap derive structures for the `konnectx` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// konnectx -- onboard KonnectX hotspots from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "konnectx",
    version,
    about = "Onboard KonnectX hotspot devices from the command line",
    long_about = "Discover KonnectX hotspot devices, connect one, configure its uplink \
        Wi-Fi network and security settings, and authenticate it.\n\n\
        Run `konnectx setup` for the guided four-step wizard.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "KONNECTX_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend API root (overrides profile)
    #[arg(long, short = 'b', env = "KONNECTX_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Bearer token for the backend
    #[arg(long, env = "KONNECTX_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Account email used for device discovery (overrides profile)
    #[arg(long, env = "KONNECTX_EMAIL", global = true)]
    pub email: Option<String>,

    /// Account user id used to connect devices (overrides profile)
    #[arg(long, env = "KONNECTX_USER_ID", global = true)]
    pub user_id: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "KONNECTX_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates (staging backends)
    #[arg(long, short = 'k', env = "KONNECTX_INSECURE", global = true)]
    pub insecure: bool,

    /// HTTP timeout in seconds (overrides profile)
    #[arg(long, env = "KONNECTX_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the interactive onboarding wizard
    Setup,

    /// Discover and connect hotspot devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Scan Wi-Fi networks visible to a connected device
    #[command(alias = "net", alias = "n")]
    Networks(NetworksArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices available to the current account
    #[command(alias = "ls")]
    List,

    /// Connect a device and open a session
    Connect {
        /// Device id (see `konnectx devices list`)
        device_id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  NETWORKS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NetworksArgs {
    #[command(subcommand)]
    pub command: NetworksCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworksCommand {
    /// Scan for Wi-Fi networks
    Scan {
        /// Connected device id
        #[arg(long, short = 'd')]
        device: String,

        /// Session id returned by `konnectx devices connect`
        #[arg(long, short = 's')]
        session: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (backend, email, user_id, token_env, user_file, ca_cert, insecure, timeout)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a bearer token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
