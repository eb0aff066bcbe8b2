//! `konnectx config ...`: profile management. Runs without a backend.

use dialoguer::{Input, Select};
use secrecy::SecretString;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const DEFAULT_BACKEND: &str = "https://api.konnectx.com/v1/";

const PROFILE_KEYS: &str =
    "backend, email, user_id, token, token_env, user_file, ca_cert, insecure, timeout";

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),
        ConfigCommand::Show => show(global),
        ConfigCommand::Set { key, value } => set(global, &key, value),
        ConfigCommand::Profiles => profiles(global),
        ConfigCommand::Use { name } => use_profile(name),
        ConfigCommand::SetToken { profile } => set_token(global, profile),
    }
}

// ── Prompt helpers ──────────────────────────────────────────────────

/// Wrap a failed prompt (closed stdin, no terminal) as a usage error.
pub(crate) fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn keyring_err(e: impl std::fmt::Display) -> CliError {
    CliError::Keyring {
        reason: e.to_string(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn ask(prompt: &str, optional: bool) -> Result<Option<String>, CliError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(optional)
        .interact_text()
        .map_err(prompt_err)?;
    Ok(non_empty(&value))
}

/// Put `token` in the keyring, or hand it back for the config file when
/// the user prefers plaintext.
fn place_token(token: String, profile_name: &str) -> Result<Option<String>, CliError> {
    let choice = Select::new()
        .with_prompt("Store the token in")
        .items(&["system keyring", "config file (plaintext)"])
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    if choice != 0 {
        return Ok(Some(token));
    }
    config::store_token(profile_name, &SecretString::from(token)).map_err(keyring_err)?;
    eprintln!("  ✓ token saved to the system keyring");
    Ok(None)
}

// ── init ────────────────────────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let path = config::config_path();
    eprintln!("Setting up a konnectx profile in {}\n", path.display());

    let name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".to_owned())
        .interact_text()
        .map_err(prompt_err)?;
    let backend: String = Input::new()
        .with_prompt("Backend URL")
        .default(DEFAULT_BACKEND.to_owned())
        .validate_with(|raw: &String| {
            konnectx_config::parse_backend(raw)
                .map(drop)
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;
    let email = ask("Account email", false)?;
    let user_id = ask("Account user id (empty: read it from the token)", true)?;

    let token = rpassword::prompt_password("Bearer token (empty for none): ").map_err(prompt_err)?;
    let token = match non_empty(&token) {
        Some(token) => place_token(token, &name)?,
        None => None,
    };

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(
        name.clone(),
        Profile {
            backend,
            email,
            user_id,
            token,
            ..Profile::default()
        },
    );
    cfg.default_profile = Some(name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Saved profile '{name}' as the default");
    eprintln!("  Next: konnectx devices list, or konnectx setup");
    Ok(())
}

// ── show ────────────────────────────────────────────────────────────

/// The config with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for token in cfg.profiles.values_mut().filter_map(|p| p.token.as_mut()) {
        *token = "****".into();
    }
    cfg
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = redacted(&config::load_config_or_default());
    let text = config::to_toml(&cfg)?;
    let out = output::render_single(
        global.output,
        &cfg,
        |_| text.trim_end().to_owned(),
        |_| config::config_path().display().to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── set ─────────────────────────────────────────────────────────────

fn set(global: &GlobalOpts, key: &str, value: String) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    let name = config::active_profile_name(global, &cfg);
    set_profile_key(cfg.profiles.entry(name.clone()).or_default(), key, value)?;
    config::save_config(&cfg)?;
    eprintln!("✓ {key} updated on profile '{name}'");
    Ok(())
}

fn parse_flag<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("expected {expected}, got '{value}'"),
    })
}

/// Apply `key = value` to a profile. Empty values clear optional keys.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key.replace('-', "_").as_str() {
        "backend" => {
            konnectx_config::parse_backend(&value)?;
            profile.backend = value;
        }
        "email" => profile.email = non_empty(&value),
        "user_id" => profile.user_id = non_empty(&value),
        "token" => profile.token = non_empty(&value),
        "token_env" => profile.token_env = non_empty(&value),
        "user_file" => profile.user_file = non_empty(&value).map(Into::into),
        "ca_cert" => profile.ca_cert = non_empty(&value).map(Into::into),
        "insecure" => profile.insecure = Some(parse_flag(key, &value, "true or false")?),
        "timeout" => profile.timeout = Some(parse_flag(key, &value, "seconds")?),
        _ => {
            return Err(CliError::Validation {
                field: key.into(),
                reason: format!("unknown key; valid keys are {PROFILE_KEYS}"),
            });
        }
    }
    Ok(())
}

// ── profiles / use ──────────────────────────────────────────────────

#[derive(Serialize)]
struct ProfileEntry {
    name: String,
    backend: String,
    email: Option<String>,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Backend")]
    backend: String,
    #[tabled(rename = "Email")]
    email: String,
}

impl From<&ProfileEntry> for ProfileRow {
    fn from(e: &ProfileEntry) -> Self {
        Self {
            marker: if e.default { "*" } else { "" },
            name: e.name.clone(),
            backend: e.backend.clone(),
            email: e.email.clone().unwrap_or_default(),
        }
    }
}

fn profile_entries(cfg: &Config) -> Vec<ProfileEntry> {
    let default = cfg.active_profile_name(None);
    cfg.profiles
        .iter()
        .map(|(name, p)| ProfileEntry {
            name: name.clone(),
            backend: p.backend.clone(),
            email: p.email.clone(),
            default: *name == default,
        })
        .collect()
}

fn profiles(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    if cfg.profiles.is_empty() {
        eprintln!("No profiles configured. Create one with: konnectx config init");
        return Ok(());
    }
    let entries = profile_entries(&cfg);
    let out = output::render_list(
        global.output,
        &entries,
        |e| ProfileRow::from(e),
        |e| e.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn require_profile(cfg: &Config, name: String) -> Result<String, CliError> {
    if cfg.profiles.contains_key(&name) {
        Ok(name)
    } else {
        Err(CliError::ProfileNotFound {
            available: config::available_profiles(cfg),
            name,
        })
    }
}

fn use_profile(name: String) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    let name = require_profile(&cfg, name)?;
    cfg.default_profile = Some(name.clone());
    config::save_config(&cfg)?;
    eprintln!("✓ '{name}' is now the default profile");
    Ok(())
}

// ── set-token ───────────────────────────────────────────────────────

fn set_token(global: &GlobalOpts, profile: Option<String>) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let name = require_profile(
        &cfg,
        profile.unwrap_or_else(|| config::active_profile_name(global, &cfg)),
    )?;

    let token = rpassword::prompt_password(format!("Bearer token for '{name}': "))
        .map_err(prompt_err)?;
    let token = non_empty(&token).ok_or_else(|| CliError::Validation {
        field: "token".into(),
        reason: "value cannot be empty".into(),
    })?;
    config::store_token(&name, &SecretString::from(token)).map_err(keyring_err)?;

    eprintln!("✓ Token for '{name}' saved to the system keyring");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                backend: DEFAULT_BACKEND.into(),
                token: Some("super-secret".into()),
                token_env: Some("KX_TOKEN".into()),
                ..Profile::default()
            },
        );
        cfg.profiles.insert(
            "staging".into(),
            Profile {
                backend: "https://staging.konnectx.com/v1/".into(),
                email: Some("qa@konnectx.com".into()),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn show_masks_plaintext_tokens() {
        let text = config::to_toml(&redacted(&sample())).unwrap();
        assert!(!text.contains("super-secret"));
        assert!(text.contains(r#"token = "****""#));
        assert!(text.contains(r#"token_env = "KX_TOKEN""#));
        assert!(text.contains("display_delay_ms = 1500"));
    }

    #[test]
    fn profile_entries_mark_the_default() {
        let entries = profile_entries(&sample());
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["default", "staging"]);
        assert!(entries[0].default);
        assert!(!entries[1].default);
        assert_eq!(ProfileRow::from(&entries[1]).email, "qa@konnectx.com");
    }

    #[test]
    fn set_validates_values() {
        let mut profile = Profile::default();
        set_profile_key(&mut profile, "timeout", "12".into()).unwrap();
        assert_eq!(profile.timeout, Some(12));

        set_profile_key(&mut profile, "user-id", "  u-9 ".into()).unwrap();
        assert_eq!(profile.user_id.as_deref(), Some("u-9"));

        set_profile_key(&mut profile, "email", String::new()).unwrap();
        assert_eq!(profile.email, None);

        assert!(set_profile_key(&mut profile, "insecure", "maybe".into()).is_err());
        assert!(set_profile_key(&mut profile, "backend", "ftp://x".into()).is_err());
        assert!(matches!(
            set_profile_key(&mut profile, "site", "x".into()),
            Err(CliError::Validation { field, .. }) if field == "site"
        ));
    }

    #[test]
    fn unknown_profile_lists_available() {
        let err = require_profile(&sample(), "prod".into()).unwrap_err();
        match err {
            CliError::ProfileNotFound { available, .. } => {
                assert_eq!(available, "default, staging");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
