//! Two-phase rendezvous between a migration requester and its preparer.
//!
//! A migration synchronizes its two participants exactly twice: the
//! preparer fires `completed` once capture is done, releasing the
//! requester to report the result; the requester fires `released` once
//! the result has been committed, releasing the preparer to finalize the
//! pod. Each signal transitions exactly once and is never reset.

use std::fmt::{Display, Formatter};

use serde::Serialize;
use tokio::sync::watch;

/// Error returned when a one-shot signal is fired a second time.
///
/// A double fire is a programming error on the caller's side; the signal
/// rejects it instead of blocking or silently absorbing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyFired;

impl Display for AlreadyFired {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "signal already fired")
    }
}

impl std::error::Error for AlreadyFired {}

/// One-shot, single-fire synchronization primitive.
///
/// Retains the fired state, so waiters that arrive after the fire return
/// immediately, and any number of tasks may wait on the same signal.
#[derive(Debug)]
pub struct OnceSignal {
    tx: watch::Sender<bool>,
}

impl OnceSignal {
    /// Create an unfired signal.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Fire the signal, waking all current and future waiters.
    ///
    /// Never blocks the sender.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyFired`] if the signal has fired before.
    pub fn fire(&self) -> Result<(), AlreadyFired> {
        if self.tx.send_replace(true) {
            Err(AlreadyFired)
        } else {
            Ok(())
        }
    }

    /// Wait until the signal fires. Returns immediately if it already has.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives inside `self`, so the channel cannot close
        // while this borrow is held.
        let _ = rx.wait_for(|fired| *fired).await;
    }

    /// Whether the signal has fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for OnceSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Observable phase of a migration's handshake.
///
/// Transitions are strictly ordered: `AwaitingCapture` →
/// `CaptureComplete` → `Released`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MigrationPhase {
    /// Preparer has not reported capture completion yet.
    AwaitingCapture,
    /// Capture is complete; the requester has not released the preparer.
    CaptureComplete,
    /// Preparer released; it may finalize the pod.
    Released,
}

/// The paired signals of one migration.
#[derive(Debug, Default)]
pub struct Handshake {
    completed: OnceSignal,
    released: OnceSignal,
}

impl Handshake {
    /// Create a handshake in the `AwaitingCapture` phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Preparer side: report that checkpoint capture is complete.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyFired`] if capture was already reported.
    pub fn complete(&self) -> Result<(), AlreadyFired> {
        self.completed.fire()
    }

    /// Requester side: release the preparer to finalize the pod.
    ///
    /// Must only be fired after the result has been committed to the
    /// caller; the phase machine treats a release without a preceding
    /// completion as a programming error.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyFired`] if the preparer was already released.
    pub fn release(&self) -> Result<(), AlreadyFired> {
        debug_assert!(
            self.completed.is_fired(),
            "released fired before capture completed"
        );
        self.released.fire()
    }

    /// Wait until the preparer has reported capture completion.
    pub async fn wait_captured(&self) {
        self.completed.wait().await;
    }

    /// Wait until the requester has released the preparer.
    pub async fn wait_released(&self) {
        self.released.wait().await;
    }

    /// Current phase of the handshake.
    #[must_use]
    pub fn phase(&self) -> MigrationPhase {
        match (self.completed.is_fired(), self.released.is_fired()) {
            (false, _) => MigrationPhase::AwaitingCapture,
            (true, false) => MigrationPhase::CaptureComplete,
            (true, true) => MigrationPhase::Released,
        }
    }
}
