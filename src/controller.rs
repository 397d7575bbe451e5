//! Access code entry controller.
//!
//! [`AccessCodeController`] owns the entry state machine. Every edit runs
//! the synchronous format rules and re-arms the debounce window; manual and
//! debounced submissions funnel into one submit path that mints a
//! [`RequestToken`] per attempt. Completions come back as
//! [`ControllerMessage`]s on an internal channel; the host takes
//! `message_rx` and pumps each message into
//! [`handle_message`](AccessCodeController::handle_message), so all state
//! changes happen on the host's own context. Only the token of the current
//! attempt may change the visible outcome; anything superseded by a newer
//! submission or a later edit is discarded silently.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::client::{AccessCodeClient, ValidationBackend};
use crate::config::GateConfig;
use crate::debounce::DebounceScheduler;
use crate::format::{self, FormatError};
use crate::models::{RequestToken, ValidationDetails, ValidationOutcome};

/// Validation phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No unresolved submission
    Idle,
    /// The most recent submission has not resolved yet
    Validating,
}

/// Messages received from async operations (timer fires, request completions)
#[derive(Debug, Clone)]
pub enum ControllerMessage {
    /// The debounce window elapsed for the given scheduler epoch
    DebounceElapsed { epoch: u64 },
    /// A validation request resolved with an outcome
    RequestResolved {
        token: RequestToken,
        outcome: ValidationOutcome,
    },
}

/// Observer for controller notifications.
///
/// All methods have no-op defaults; hosts implement the ones they need.
/// Callbacks run synchronously on the controller's context.
pub trait GateObserver: Send + Sync {
    /// The code text changed. Fires on every edit, valid or not.
    fn on_change(&self, _code: &str) {}

    /// A submission resolved. `is_valid` is true only for an accepted code.
    fn on_validate(&self, _is_valid: bool) {}

    /// A submission resolved with an accepted code. Fires after
    /// [`on_validate`](GateObserver::on_validate), only for acceptance.
    fn on_validated(&self, _details: &ValidationDetails) {}
}

/// State machine driving debounced access-code validation.
pub struct AccessCodeController {
    /// Current access code text
    code: String,
    /// Format rule failure for the current text, if any
    format_error: Option<FormatError>,
    /// Outcome of the most recently applied resolution, if any
    outcome: Option<ValidationOutcome>,
    /// Current validation phase
    phase: Phase,
    /// Mint counter for request tokens
    token_seq: u64,
    /// Token of the most recent submission; older resolutions are stale
    current_token: Option<RequestToken>,
    /// Quiet-window timer for automatic validation
    debounce: DebounceScheduler,
    /// Network seam for validation requests
    backend: Arc<dyn ValidationBackend>,
    /// Host-facing notifications
    observer: Arc<dyn GateObserver>,
    /// Receiver for async messages (take this and pump into handle_message)
    pub message_rx: Option<mpsc::UnboundedReceiver<ControllerMessage>>,
    /// Sender for async messages (cloned into timer and request tasks)
    message_tx: mpsc::UnboundedSender<ControllerMessage>,
}

impl AccessCodeController {
    /// Create a controller over the given backend and observer.
    pub fn new(backend: Arc<dyn ValidationBackend>, observer: Arc<dyn GateObserver>) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        Self {
            code: String::new(),
            format_error: format::validate("").err(),
            outcome: None,
            phase: Phase::Idle,
            token_seq: 0,
            current_token: None,
            debounce: DebounceScheduler::new(),
            backend,
            observer,
            message_rx: Some(message_rx),
            message_tx,
        }
    }

    /// Create a controller wired to a real HTTP client per the config.
    pub fn from_config(config: &GateConfig, observer: Arc<dyn GateObserver>) -> Self {
        let backend = Arc::new(AccessCodeClient::from_config(config));
        Self::new(backend, observer).with_debounce(config.debounce)
    }

    /// Set a custom debounce window.
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce = DebounceScheduler::new().with_delay(delay);
        self
    }

    /// The current access code text.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The format rule failure for the current text, if any.
    pub fn format_error(&self) -> Option<&FormatError> {
        self.format_error.as_ref()
    }

    /// Whether the current text passes the format rules.
    pub fn is_format_valid(&self) -> bool {
        self.format_error.is_none()
    }

    /// The outcome of the most recently applied resolution, if any.
    pub fn outcome(&self) -> Option<&ValidationOutcome> {
        self.outcome.as_ref()
    }

    /// The current validation phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Apply an edit to the access code text.
    ///
    /// Runs the format rules synchronously and notifies the observer on
    /// every edit. A pending debounce window is always cancelled; a new one
    /// is armed only when the new text is format-valid. A format-invalid
    /// edit also drops the displayed outcome, which would otherwise speak
    /// for text that no longer exists. An edit during validation withdraws
    /// the in-flight attempt; its late result is discarded on arrival.
    pub fn on_edit(&mut self, text: &str) {
        self.code = text.to_string();
        self.format_error = format::validate(&self.code).err();

        if self.format_error.is_some() {
            self.outcome = None;
        }

        // Withdraw any in-flight attempt: the edited text supersedes the
        // submitted one. The request keeps running; the token guard
        // discards its resolution.
        if self.phase == Phase::Validating {
            tracing::trace!(token = ?self.current_token, "Withdrawing in-flight validation");
            self.current_token = None;
            self.phase = Phase::Idle;
        }

        self.observer.on_change(&self.code);

        self.debounce.cancel();
        if self.format_error.is_none() {
            let tx = self.message_tx.clone();
            let epoch = self.debounce.schedule(move |epoch| {
                let _ = tx.send(ControllerMessage::DebounceElapsed { epoch });
            });
            tracing::trace!(epoch, "Armed auto-validation window");
        }
    }

    /// Request an immediate validation of the current code.
    ///
    /// Manual entry point into the same submission funnel the debounce
    /// window uses. Does not disturb an armed window.
    pub fn on_submit_requested(&mut self) {
        self.submit();
    }

    /// Apply an async completion message.
    ///
    /// The host takes `message_rx` and pumps every received message here.
    pub fn handle_message(&mut self, message: ControllerMessage) {
        match message {
            ControllerMessage::DebounceElapsed { epoch } => {
                if !self.debounce.is_current(epoch) {
                    tracing::trace!(epoch, "Discarding superseded debounce fire");
                    return;
                }
                self.submit();
            }
            ControllerMessage::RequestResolved { token, outcome } => {
                self.apply_resolution(token, outcome);
            }
        }
    }

    /// Submission funnel shared by the debounced and manual paths.
    ///
    /// Format-invalid text never reaches the network. Overlapping
    /// submissions are allowed; the token minted last wins at resolution
    /// time.
    fn submit(&mut self) {
        if self.format_error.is_some() {
            tracing::debug!("Ignoring submit for format-invalid code");
            return;
        }

        // Guard: only spawn if a tokio runtime is available (avoids panics in sync tests)
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::debug!("No async runtime available, submit dropped");
            return;
        }

        self.token_seq += 1;
        let token = RequestToken::new(self.token_seq);
        self.current_token = Some(token);
        self.phase = Phase::Validating;

        let backend = Arc::clone(&self.backend);
        let tx = self.message_tx.clone();
        let code = self.code.clone();
        tracing::debug!(token = %token, "Submitting access code for validation");

        tokio::spawn(async move {
            let outcome = backend.validate(&code).await;
            let _ = tx.send(ControllerMessage::RequestResolved { token, outcome });
        });
    }

    /// Apply a resolved request, unless a newer submission superseded it.
    fn apply_resolution(&mut self, token: RequestToken, outcome: ValidationOutcome) {
        if self.current_token != Some(token) {
            tracing::trace!(token = %token, "Discarding stale validation result");
            return;
        }

        let is_valid = outcome.is_valid();
        tracing::debug!(token = %token, valid = is_valid, "Applying validation result");

        self.outcome = Some(outcome);
        self.phase = Phase::Idle;
        self.current_token = None;

        self.observer.on_validate(is_valid);
        if let Some(ValidationOutcome::Valid(details)) = &self.outcome {
            self.observer.on_validated(details);
        }
    }
}
