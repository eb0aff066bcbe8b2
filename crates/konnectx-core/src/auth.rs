// ── Authentication strategy ──
//
// Phase 4 confirms the device with the backend. Today that confirmation is
// a timed progress animation; the strategy trait lets a real handshake
// replace it without touching the wizard.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::AuthPacing;
use crate::error::CoreError;

/// What the strategy is authenticating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub device_id: String,
    pub session_id: String,
}

/// Progress sink, called with a percentage in `0..=100`.
pub type ProgressFn = dyn Fn(u8) + Send + Sync;

/// Confirms a configured device.
#[async_trait]
pub trait AuthenticationStrategy: Send + Sync {
    /// Run to completion, reporting progress along the way.
    ///
    /// Implementations must eventually report `100` on success.
    async fn authenticate(&self, ctx: &AuthContext, progress: &ProgressFn)
    -> Result<(), CoreError>;
}

/// Fixed-rate progress animation with no failure path.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedAuthentication {
    step: u8,
    interval: Duration,
}

impl SimulatedAuthentication {
    /// A step of zero is treated as one so the animation always finishes.
    pub fn new(step: u8, interval: Duration) -> Self {
        Self {
            step: step.clamp(1, 100),
            interval,
        }
    }

    /// Time from start to 100%.
    pub fn total_duration(&self) -> Duration {
        let ticks = 100_u32.div_ceil(u32::from(self.step));
        self.interval * ticks
    }
}

impl Default for SimulatedAuthentication {
    fn default() -> Self {
        Self::from(AuthPacing::default())
    }
}

impl From<AuthPacing> for SimulatedAuthentication {
    fn from(pacing: AuthPacing) -> Self {
        Self::new(pacing.step, pacing.interval)
    }
}

#[async_trait]
impl AuthenticationStrategy for SimulatedAuthentication {
    async fn authenticate(
        &self,
        ctx: &AuthContext,
        progress: &ProgressFn,
    ) -> Result<(), CoreError> {
        debug!(device_id = %ctx.device_id, "simulated authentication started");
        let mut value: u8 = 0;
        while value < 100 {
            tokio::time::sleep(self.interval).await;
            value = value.saturating_add(self.step).min(100);
            progress(value);
        }
        debug!(device_id = %ctx.device_id, "simulated authentication finished");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn ctx() -> AuthContext {
        AuthContext {
            device_id: "dev1".into(),
            session_id: "sess-123".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reaches_100_exactly_once_in_three_seconds() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let strategy = SimulatedAuthentication::default();

        let start = tokio::time::Instant::now();
        strategy
            .authenticate(&ctx(), &move |p: u8| sink.lock().unwrap().push(p))
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(3));
        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    }

    #[tokio::test(start_paused = true)]
    async fn uneven_step_clamps_at_100() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let strategy = SimulatedAuthentication::new(30, Duration::from_millis(100));
        assert_eq!(strategy.total_duration(), Duration::from_millis(400));

        strategy
            .authenticate(&ctx(), &move |p: u8| sink.lock().unwrap().push(p))
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![30, 60, 90, 100]);
    }

    #[test]
    fn zero_step_still_terminates() {
        let strategy = SimulatedAuthentication::new(0, Duration::from_millis(1));
        assert_eq!(strategy.total_duration(), Duration::from_millis(100));
    }
}
