//! Scripted validation backends for controller tests.
//!
//! These stand in for the HTTP client behind the controller's backend
//! seam, either answering instantly or holding calls open so tests can
//! resolve them in a chosen order.

// Shared by several test crates; not every crate uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use codegate::client::ValidationBackend;
use codegate::models::ValidationOutcome;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// A validation call held open until the test resolves it.
struct PendingValidation {
    code: String,
    responder: oneshot::Sender<ValidationOutcome>,
}

/// Backend that parks every call until the test releases it.
///
/// Lets tests resolve overlapping submissions out of order.
pub struct HeldBackend {
    pending: Mutex<Vec<PendingValidation>>,
}

impl HeldBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pending: Mutex::new(Vec::new()),
        })
    }

    /// How many calls are currently held open.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Codes of the held calls, in arrival order.
    pub fn codes(&self) -> Vec<String> {
        self.pending
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.code.clone())
            .collect()
    }

    /// Resolve the held call at `index` with `outcome`.
    ///
    /// Indices count the still-pending calls in arrival order, so
    /// releasing call 0 shifts later calls down by one.
    pub fn release(&self, index: usize, outcome: ValidationOutcome) {
        let call = self.pending.lock().unwrap().remove(index);
        let _ = call.responder.send(outcome);
    }
}

#[async_trait]
impl ValidationBackend for HeldBackend {
    async fn validate(&self, code: &str) -> ValidationOutcome {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push(PendingValidation {
            code: code.to_string(),
            responder: tx,
        });
        rx.await.unwrap_or_else(|_| ValidationOutcome::NetworkError {
            message: "backend dropped".to_string(),
        })
    }
}

/// Wait until `backend` holds `count` unresolved calls.
///
/// Spawned request tasks need a few polls to reach the backend; panics
/// if they never do.
pub async fn wait_for_pending(backend: &HeldBackend, count: usize) {
    for _ in 0..50 {
        if backend.pending_count() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("backend never reached {} pending calls", count);
}

/// Backend that answers instantly with a fixed outcome, recording every
/// requested code.
pub struct CountingBackend {
    outcome: ValidationOutcome,
    calls: Mutex<Vec<String>>,
}

impl CountingBackend {
    pub fn returning(outcome: ValidationOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// How many calls the backend has answered.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every requested code, in arrival order.
    pub fn codes(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ValidationBackend for CountingBackend {
    async fn validate(&self, code: &str) -> ValidationOutcome {
        self.calls.lock().unwrap().push(code.to_string());
        self.outcome.clone()
    }
}
