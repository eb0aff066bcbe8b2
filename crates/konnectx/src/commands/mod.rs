//! Command dispatch: bridges CLI args -> backend / wizard -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod networks;
pub mod setup;

use std::sync::Arc;

use konnectx_core::{OnboardingBackend, OnboardingConfig, StoredIdentity, build_client};

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// A resolved profile plus a live backend client.
pub struct Context {
    pub profile_name: String,
    pub backend: Arc<dyn OnboardingBackend>,
    pub identity: Arc<StoredIdentity>,
    pub config: OnboardingConfig,
}

impl Context {
    pub fn new(resolved: Resolved) -> Result<Self, CliError> {
        let client = build_client(&resolved.onboarding)?;
        Ok(Self {
            profile_name: resolved.profile_name,
            backend: Arc::new(client),
            identity: Arc::new(resolved.identity),
            config: resolved.onboarding,
        })
    }
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: Context, global: &GlobalOpts) -> Result<(), CliError> {
    let profile_name = ctx.profile_name.clone();
    let result = match cmd {
        Command::Setup => setup::handle(ctx, global).await,
        Command::Devices(args) => devices::handle(&ctx, args, global).await,
        Command::Networks(args) => networks::handle(&ctx, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    };
    result.map_err(|e| e.for_profile(&profile_name))
}
