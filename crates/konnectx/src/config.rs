//! CLI configuration: thin wrapper around `konnectx_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--backend, --token, --email, ...).

use secrecy::SecretString;

use konnectx_core::{OnboardingConfig, StoredIdentity};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use konnectx_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default, save_config,
    store_token, to_toml,
};

/// Everything a backend command needs.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub onboarding: OnboardingConfig,
    pub identity: StoredIdentity,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Load the config file and resolve the active profile with flag overrides.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // An explicitly named profile must exist.
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None if global.backend.is_some() => Profile::default(),
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    resolve_profile(profile, &profile_name, &cfg.defaults, global)
}

/// Translate a `Profile` + global flags into runtime config and identity.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    mut profile: Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<Resolved, CliError> {
    if let Some(ref backend) = global.backend {
        profile.backend.clone_from(backend);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if let Some(ref email) = global.email {
        profile.email = Some(email.clone());
    }
    if let Some(ref user_id) = global.user_id {
        profile.user_id = Some(user_id.clone());
    }

    let mut onboarding =
        konnectx_config::profile_to_onboarding_config(&profile, profile_name, defaults)?;
    if let Some(ref token) = global.token {
        onboarding.bearer_token = Some(SecretString::from(token.clone()));
    }
    let identity = konnectx_config::resolve_identity(&profile, onboarding.bearer_token.as_ref());

    Ok(Resolved {
        profile_name: profile_name.to_owned(),
        onboarding,
        identity,
    })
}

/// Comma-separated profile names for help text.
pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use clap::Parser;
    use konnectx_core::IdentityProvider;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["konnectx"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["devices", "list"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn staging() -> Profile {
        Profile {
            backend: "https://staging.konnectx.com/v1/".into(),
            email: Some("profile@konnectx.com".into()),
            user_id: Some("u-1".into()),
            timeout: Some(10),
            ..Profile::default()
        }
    }

    #[test]
    fn flags_override_profile() {
        let global = global(&[
            "--backend",
            "http://127.0.0.1:9000/v1",
            "--email",
            "demo@konnectx.com",
            "--timeout",
            "3",
            "-k",
        ]);
        let resolved =
            resolve_profile(staging(), "staging", &Defaults::default(), &global).unwrap();

        assert_eq!(
            resolved.onboarding.backend_url.as_str(),
            "http://127.0.0.1:9000/v1/"
        );
        assert_eq!(resolved.onboarding.timeout, Duration::from_secs(3));
        assert_eq!(
            resolved.onboarding.tls,
            konnectx_core::TlsVerification::DangerAcceptInvalid
        );
        assert_eq!(
            resolved.identity.current_user_email().as_deref(),
            Some("demo@konnectx.com")
        );
        assert_eq!(resolved.identity.current_user_id().as_deref(), Some("u-1"));
    }

    #[test]
    fn profile_values_apply_without_flags() {
        let resolved =
            resolve_profile(staging(), "staging", &Defaults::default(), &global(&[])).unwrap();
        assert_eq!(resolved.profile_name, "staging");
        assert_eq!(resolved.onboarding.timeout, Duration::from_secs(10));
        assert_eq!(
            resolved.identity.current_user_email().as_deref(),
            Some("profile@konnectx.com")
        );
    }

    #[test]
    fn token_flag_becomes_bearer_token() {
        use secrecy::ExposeSecret;

        let resolved = resolve_profile(
            staging(),
            "staging",
            &Defaults::default(),
            &global(&["--token", "abc"]),
        )
        .unwrap();
        let token = resolved.onboarding.bearer_token.unwrap();
        assert_eq!(token.expose_secret(), "abc");
    }

    #[test]
    fn empty_backend_is_rejected() {
        let err = resolve_profile(
            Profile::default(),
            "default",
            &Defaults::default(),
            &global(&[]),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn available_profiles_are_sorted() {
        let mut cfg = Config::default();
        assert_eq!(available_profiles(&cfg), "(none)");
        cfg.profiles.insert("staging".into(), Profile::default());
        cfg.profiles.insert("prod".into(), Profile::default());
        assert_eq!(available_profiles(&cfg), "prod, staging");
    }
}
