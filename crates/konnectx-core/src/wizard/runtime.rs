// ── Wizard runtime ──
//
// Owns the state and runs effects. Events from front-ends and from effect
// tasks arrive on one mpsc channel with a single consumer, so reducer calls
// never overlap. Every state change is published on a watch channel.

use std::future::Future;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::event::{Delay, Effect, Event, SessionRef};
use super::reducer::reduce;
use super::state::WizardState;
use crate::auth::{AuthContext, AuthenticationStrategy, SimulatedAuthentication};
use crate::backend::OnboardingBackend;
use crate::config::OnboardingConfig;
use crate::error::CoreError;
use crate::identity::IdentityProvider;
use crate::model::OnboardingSummary;

/// How a wizard run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    /// The user pressed Finish.
    Completed(Box<OnboardingSummary>),
    /// Credentials were rejected; the user must sign in again.
    SignInRequired,
    /// Cancelled, or every handle was dropped.
    Abandoned,
}

enum Message {
    Event(Event),
    /// Applied back to back, published once. `applied` fires after the
    /// resulting state is published.
    Batch {
        events: Vec<Event>,
        applied: Option<oneshot::Sender<()>>,
    },
    SignInRedirectElapsed,
}

/// Front-end handle: send events, observe state, cancel.
#[derive(Debug, Clone)]
pub struct WizardHandle {
    events: mpsc::UnboundedSender<Message>,
    state: watch::Receiver<WizardState>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Event(e) => f.debug_tuple("Event").field(e).finish(),
            Self::Batch { events, .. } => f.debug_tuple("Batch").field(&events.len()).finish(),
            Self::SignInRedirectElapsed => f.write_str("SignInRedirectElapsed"),
        }
    }
}

impl WizardHandle {
    /// Send one event. Returns `false` once the wizard has stopped.
    pub fn send(&self, event: Event) -> bool {
        self.events.send(Message::Event(event)).is_ok()
    }

    /// Send several events to be applied together; observers see only the
    /// resulting state.
    pub fn send_batch(&self, events: Vec<Event>) -> bool {
        self.events
            .send(Message::Batch {
                events,
                applied: None,
            })
            .is_ok()
    }

    /// Like [`send_batch`](Self::send_batch), but resolves once the
    /// resulting state is published. The state may equal the one before
    /// the batch, for example after a retry that failed straight away.
    /// Returns `false` if the wizard stopped first.
    pub async fn submit(&self, events: Vec<Event>) -> bool {
        let (applied, done) = oneshot::channel();
        let message = Message::Batch {
            events,
            applied: Some(applied),
        };
        self.events.send(message).is_ok() && done.await.is_ok()
    }

    /// A receiver that sees every published state.
    pub fn subscribe(&self) -> watch::Receiver<WizardState> {
        self.state.clone()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> WizardState {
        self.state.borrow().clone()
    }

    /// Stop the wizard and abort in-flight requests.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// The onboarding wizard.
///
/// ```ignore
/// let wizard = Wizard::new(backend, identity, config);
/// let handle = wizard.handle();
/// let outcome = tokio::spawn(wizard.run());
/// ```
pub struct Wizard {
    backend: Arc<dyn OnboardingBackend>,
    identity: Arc<dyn IdentityProvider>,
    auth: Arc<dyn AuthenticationStrategy>,
    config: OnboardingConfig,
    state: watch::Sender<WizardState>,
    events_tx: mpsc::UnboundedSender<Message>,
    events_rx: mpsc::UnboundedReceiver<Message>,
    cancel: CancellationToken,
}

impl Wizard {
    /// Build a wizard using simulated authentication paced by `config`.
    pub fn new(
        backend: Arc<dyn OnboardingBackend>,
        identity: Arc<dyn IdentityProvider>,
        config: OnboardingConfig,
    ) -> Self {
        let auth = Arc::new(SimulatedAuthentication::from(config.auth_pacing));
        let (state, _) = watch::channel(WizardState::default());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            identity,
            auth,
            config,
            state,
            events_tx,
            events_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the authentication strategy.
    #[must_use]
    pub fn with_authentication(mut self, auth: Arc<dyn AuthenticationStrategy>) -> Self {
        self.auth = auth;
        self
    }

    pub fn handle(&self) -> WizardHandle {
        WizardHandle {
            events: self.events_tx.clone(),
            state: self.state.subscribe(),
            cancel: self.cancel.clone(),
        }
    }

    /// Run until the user finishes, a sign-in redirect fires, or the
    /// wizard is abandoned. Fetches the device list first.
    pub async fn run(self) -> WizardOutcome {
        let Self {
            backend,
            identity,
            auth,
            config,
            state,
            events_tx,
            mut events_rx,
            cancel,
        } = self;

        // Effect tasks hold upgraded senders only while they run, so the
        // channel closes once every handle is gone and nothing is pending.
        let runner = EffectRunner {
            backend,
            identity,
            auth,
            config,
            events: events_tx.downgrade(),
            cancel: cancel.clone(),
        };
        drop(events_tx);

        info!("onboarding wizard started");
        let mut pending = vec![Event::LoadDevices];
        let mut acks: Vec<oneshot::Sender<()>> = Vec::new();

        let outcome = loop {
            if !pending.is_empty() {
                if let Some(outcome) = dispatch(&state, &runner, mem::take(&mut pending)) {
                    break outcome;
                }
            }
            for ack in acks.drain(..) {
                let _ = ack.send(());
            }

            let message = tokio::select! {
                () = cancel.cancelled() => break WizardOutcome::Abandoned,
                message = events_rx.recv() => message,
            };

            match message {
                Some(Message::Event(event)) => pending.push(event),
                Some(Message::Batch { events, applied }) => {
                    pending.extend(events);
                    acks.extend(applied);
                }
                Some(Message::SignInRedirectElapsed) => break WizardOutcome::SignInRequired,
                None => break WizardOutcome::Abandoned,
            }
        };

        cancel.cancel();
        match &outcome {
            WizardOutcome::Completed(_) => info!("onboarding completed"),
            WizardOutcome::SignInRequired => warn!("onboarding stopped: sign-in required"),
            WizardOutcome::Abandoned => info!("onboarding abandoned"),
        }
        outcome
    }
}

/// Apply `events` in order, publish the result once, then start effects.
fn dispatch(
    state: &watch::Sender<WizardState>,
    runner: &EffectRunner,
    events: Vec<Event>,
) -> Option<WizardOutcome> {
    let mut effects = Vec::new();
    state.send_modify(|current| {
        for event in events {
            let transition = reduce(mem::take(current), event);
            *current = transition.state;
            effects.extend(transition.effects);
        }
    });

    let mut outcome = None;
    for effect in effects {
        if let Some(done) = runner.execute(effect) {
            outcome = Some(done);
        }
    }
    outcome
}

struct EffectRunner {
    backend: Arc<dyn OnboardingBackend>,
    identity: Arc<dyn IdentityProvider>,
    auth: Arc<dyn AuthenticationStrategy>,
    config: OnboardingConfig,
    events: mpsc::WeakUnboundedSender<Message>,
    cancel: CancellationToken,
}

impl EffectRunner {
    fn execute(&self, effect: Effect) -> Option<WizardOutcome> {
        debug!(?effect, "executing effect");
        match effect {
            Effect::FetchDevices => {
                let backend = Arc::clone(&self.backend);
                let email = self.identity.current_user_email();
                self.request(
                    async move {
                        let email = email.ok_or(CoreError::MissingIdentity { field: "email" })?;
                        backend.list_devices(&email).await
                    },
                    |result| match result {
                        Ok(devices) => Event::DevicesLoaded(devices),
                        Err(e) => Event::DevicesFailed(e.to_failure()),
                    },
                );
            }
            Effect::ConnectDevice { device_id } => {
                let backend = Arc::clone(&self.backend);
                let user_id = self.identity.current_user_id();
                self.request(
                    async move {
                        let user_id =
                            user_id.ok_or(CoreError::MissingIdentity { field: "user id" })?;
                        backend.connect_device(&device_id, &user_id).await
                    },
                    |result| match result {
                        Ok(session) => Event::Connected(session),
                        Err(e) => Event::ConnectFailed(e.to_failure()),
                    },
                );
            }
            Effect::ScanNetworks {
                device_id,
                session_id,
            } => {
                let backend = Arc::clone(&self.backend);
                let origin = SessionRef::new(device_id.clone(), session_id.clone());
                self.request(
                    async move { backend.scan_networks(&device_id, &session_id).await },
                    |result| match result {
                        Ok(scan) => Event::NetworksScanned(origin, scan),
                        Err(e) => Event::ScanFailed(origin, e.to_failure()),
                    },
                );
            }
            Effect::ConfigureNetwork(config) => {
                let backend = Arc::clone(&self.backend);
                let origin = SessionRef::new(config.device_id.clone(), config.session_id.clone());
                self.request(
                    async move { backend.configure_network(&config).await },
                    |result| match result {
                        Ok(details) => Event::Configured(origin, details),
                        Err(e) => Event::ConfigureFailed(origin, e.to_failure()),
                    },
                );
            }
            Effect::Authenticate(ctx) => self.authenticate(ctx),
            Effect::Schedule { after, event } => {
                let delay = match after {
                    Delay::Display => self.config.display_delay,
                    Delay::SessionExpired => self.config.session_expired_delay,
                };
                self.after(delay, Message::Event(event));
            }
            Effect::RedirectToSignIn => {
                self.after(
                    self.config.sign_in_redirect_delay,
                    Message::SignInRedirectElapsed,
                );
            }
            Effect::Complete(summary) => return Some(WizardOutcome::Completed(summary)),
        }
        None
    }

    /// Run a backend call under the request timeout and the wizard's
    /// cancellation, then feed its completion event back.
    fn request<T, F, M>(&self, call: F, complete: M)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, CoreError>> + Send + 'static,
        M: FnOnce(Result<T, CoreError>) -> Event + Send + 'static,
    {
        let Some(tx) = self.events.upgrade() else {
            return;
        };
        let token = self.cancel.child_token();
        let limit = self.config.request_timeout;

        tokio::spawn(async move {
            let result = tokio::select! {
                () = token.cancelled() => {
                    debug!("request cancelled");
                    return;
                }
                result = tokio::time::timeout(limit, call) => match result {
                    Ok(result) => result,
                    Err(_) => Err(CoreError::Timeout {
                        timeout_secs: limit.as_secs(),
                    }),
                },
            };
            if let Err(ref e) = result {
                warn!(error = %e, "wizard request failed");
            }
            let _ = tx.send(Message::Event(complete(result)));
        });
    }

    fn authenticate(&self, ctx: AuthContext) {
        let Some(tx) = self.events.upgrade() else {
            return;
        };
        let auth = Arc::clone(&self.auth);
        let token = self.cancel.child_token();

        tokio::spawn(async move {
            let progress_tx = tx.clone();
            let progress = move |value: u8| {
                let _ = progress_tx.send(Message::Event(Event::AuthenticationProgress(value)));
            };
            let result = tokio::select! {
                () = token.cancelled() => return,
                result = auth.authenticate(&ctx, &progress) => result,
            };
            let event = match result {
                Ok(()) => Event::Authenticated,
                Err(e) => {
                    warn!(error = %e, "device authentication failed");
                    Event::AuthenticationFailed(e.to_failure())
                }
            };
            let _ = tx.send(Message::Event(event));
        });
    }

    fn after(&self, delay: Duration, message: Message) {
        let Some(tx) = self.events.upgrade() else {
            return;
        };
        let token = self.cancel.child_token();
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    let _ = tx.send(message);
                }
            }
        });
    }
}
