//! Shared configuration for the konnectx binaries.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `konnectx_core::OnboardingConfig` plus the identity the
//! wizard reads. The CLI layers its `GlobalOpts` overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use konnectx_core::{OnboardingConfig, StoredIdentity, StoredUser, TlsVerification};

/// Keyring service name for stored tokens.
pub const KEYRING_SERVICE: &str = "konnectx";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level `config.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles, ordered by name.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the active profile: explicit choice, else the default.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    /// HTTP timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Upper bound for one wizard operation, seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// How long success notices stay up before the wizard advances.
    #[serde(default = "default_display_delay")]
    pub display_delay_ms: u64,

    #[serde(default = "default_redirect_delay")]
    pub session_expired_delay_ms: u64,

    #[serde(default = "default_redirect_delay")]
    pub sign_in_redirect_delay_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
            request_timeout: default_request_timeout(),
            display_delay_ms: default_display_delay(),
            session_expired_delay_ms: default_redirect_delay(),
            sign_in_redirect_delay_ms: default_redirect_delay(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_request_timeout() -> u64 {
    45
}
fn default_display_delay() -> u64 {
    1500
}
fn default_redirect_delay() -> u64 {
    2000
}

/// A named backend profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Backend API root (e.g., "https://api.konnectx.com/v1/").
    pub backend: String,

    /// Email used for device discovery.
    pub email: Option<String>,

    /// User id sent with connect requests.
    pub user_id: Option<String>,

    /// Bearer token (plaintext, prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,

    /// JSON user object written by a sign-in flow (`{ "id", "email" }`).
    pub user_file: Option<PathBuf>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "konnectx", "konnectx").map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("konnectx");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + `KONNECTX_*` environment. A missing file
/// yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("KONNECTX_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_toml(cfg)?)?;
    Ok(())
}

/// The file form of `cfg`. Unset profile fields are omitted.
pub fn to_toml(cfg: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(cfg)?)
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/token"),
    )?)
}

/// Store a bearer token for `profile_name` in the system keyring.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token.expose_secret())?;
    Ok(())
}

/// Resolve the bearer token from the credential chain (no CLI flag step).
/// A profile without a token is valid: some backends are open.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile.token.clone().map(SecretString::from)
}

/// Build the identity the wizard reads: explicit profile fields, then the
/// stored user file, then the token's claims.
pub fn resolve_identity(profile: &Profile, token: Option<&SecretString>) -> StoredIdentity {
    let stored = profile.user_file.as_deref().and_then(read_user_file);
    let stored = stored.unwrap_or_default();
    let user = StoredUser {
        id: profile.user_id.clone().or(stored.id),
        email: profile.email.clone().or(stored.email),
    };
    StoredIdentity::new(Some(user), token.map(|t| t.expose_secret()))
}

fn read_user_file(path: &Path) -> Option<StoredUser> {
    match std::fs::read_to_string(path) {
        Ok(raw) => StoredUser::from_json(&raw),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "stored user file unreadable");
            None
        }
    }
}

/// Build an `OnboardingConfig` from a profile and the global defaults,
/// with no CLI flag overrides.
pub fn profile_to_onboarding_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<OnboardingConfig, ConfigError> {
    let url = parse_backend(&profile.backend)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = OnboardingConfig::new(url);
    config.bearer_token = resolve_token(profile, profile_name);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.request_timeout = Duration::from_secs(defaults.request_timeout);
    config.display_delay = Duration::from_millis(defaults.display_delay_ms);
    config.session_expired_delay = Duration::from_millis(defaults.session_expired_delay_ms);
    config.sign_in_redirect_delay = Duration::from_millis(defaults.sign_in_redirect_delay_ms);
    Ok(config)
}

/// Parse a backend root. A missing trailing slash is added so relative
/// endpoint paths resolve beneath it.
pub fn parse_backend(raw: &str) -> Result<url::Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Validation {
        field: "backend".into(),
        reason,
    };
    if raw.trim().is_empty() {
        return Err(invalid("no backend URL configured".into()));
    }
    let mut url: url::Url = raw
        .trim()
        .parse()
        .map_err(|_| invalid(format!("invalid URL: {raw}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
