//! Common test utilities for integration tests.
//!
//! This module provides a recording observer, scripted validation
//! backends, and helpers for pumping controller messages from tests.

pub mod mocks;

pub use mocks::*;

use codegate::controller::{AccessCodeController, GateObserver};
use codegate::models::{ValidationDetails, ValidationOutcome};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A single observer notification, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    Change(String),
    Validate(bool),
    Validated { remaining_uses: u32, max_usage: u32 },
}

/// Observer that records every notification for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every notification seen so far, in order.
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// The `on_validate` flags seen so far, in order.
    pub fn validate_events(&self) -> Vec<bool> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ObservedEvent::Validate(is_valid) => Some(is_valid),
                _ => None,
            })
            .collect()
    }

    /// How many times `on_validated` fired.
    pub fn validated_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, ObservedEvent::Validated { .. }))
            .count()
    }
}

impl GateObserver for RecordingObserver {
    fn on_change(&self, code: &str) {
        self.events
            .lock()
            .unwrap()
            .push(ObservedEvent::Change(code.to_string()));
    }

    fn on_validate(&self, is_valid: bool) {
        self.events
            .lock()
            .unwrap()
            .push(ObservedEvent::Validate(is_valid));
    }

    fn on_validated(&self, details: &ValidationDetails) {
        self.events.lock().unwrap().push(ObservedEvent::Validated {
            remaining_uses: details.remaining_uses,
            max_usage: details.max_usage,
        });
    }
}

/// An acceptance outcome with the given usage numbers and no expiry.
pub fn valid_outcome(remaining_uses: u32, max_usage: u32) -> ValidationOutcome {
    ValidationOutcome::Valid(ValidationDetails {
        remaining_uses,
        max_usage,
        expires_at: None,
    })
}

/// A rejection outcome with the given displayable reason.
pub fn invalid_outcome(reason: &str) -> ValidationOutcome {
    ValidationOutcome::Invalid {
        reason: reason.to_string(),
    }
}

/// Drain every ready controller message, letting spawned tasks run
/// between rounds. Returns once the queue is empty.
pub async fn pump(controller: &mut AccessCodeController) {
    let mut rx = controller
        .message_rx
        .take()
        .expect("controller receiver already taken");
    loop {
        tokio::task::yield_now().await;
        match rx.try_recv() {
            Ok(message) => controller.handle_message(message),
            Err(_) => break,
        }
    }
    controller.message_rx = Some(rx);
}

/// Pump until the controller reports an outcome. For real-time tests;
/// panics if nothing resolves within about a second.
#[allow(dead_code)]
pub async fn wait_for_outcome(controller: &mut AccessCodeController) {
    for _ in 0..200 {
        pump(controller).await;
        if controller.outcome().is_some() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("controller never resolved an outcome");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_helpers() {
        assert!(valid_outcome(1, 2).is_valid());
        assert!(!invalid_outcome("expired").is_valid());
    }

    #[test]
    fn test_recording_observer_orders_events() {
        let observer = RecordingObserver::new();
        observer.on_change("AB");
        observer.on_validate(true);
        observer.on_validated(&ValidationDetails {
            remaining_uses: 1,
            max_usage: 2,
            expires_at: None,
        });

        assert_eq!(
            observer.events(),
            vec![
                ObservedEvent::Change("AB".to_string()),
                ObservedEvent::Validate(true),
                ObservedEvent::Validated {
                    remaining_uses: 1,
                    max_usage: 2
                },
            ]
        );
        assert_eq!(observer.validate_events(), vec![true]);
        assert_eq!(observer.validated_count(), 1);
    }
}
