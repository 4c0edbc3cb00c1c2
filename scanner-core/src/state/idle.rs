//! Idle reverter
//!
//! A single countdown task. When it expires it enqueues a `RevertRequest` on a
//! bounded channel; the pipeline drains the channel between token reads and
//! applies the revert through the state machine, so the timer never writes
//! mode state itself.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const REVERT_CHANNEL_CAPACITY: usize = 4;

/// Revert notification tagged with the countdown that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevertRequest {
    pub generation: u64,
}

pub struct IdleReverter {
    timeout: Option<Duration>,
    tx: mpsc::Sender<RevertRequest>,
    generation: u64,
    countdown: Option<JoinHandle<()>>,
}

impl IdleReverter {
    /// Create a reverter for `timeout` (None disables reverting) and the
    /// receiver its revert requests arrive on.
    pub fn new(timeout: Option<Duration>) -> (Self, mpsc::Receiver<RevertRequest>) {
        let (tx, rx) = mpsc::channel(REVERT_CHANNEL_CAPACITY);
        let reverter = Self {
            timeout,
            tx,
            generation: 0,
            countdown: None,
        };
        (reverter, rx)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// (Re)start the countdown from now. Must be called within a tokio runtime.
    pub fn arm(&mut self, timeout: Duration) {
        self.cancel_countdown();
        self.generation += 1;

        let generation = self.generation;
        let tx = self.tx.clone();
        self.countdown = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Err(e) = tx.try_send(RevertRequest { generation }) {
                tracing::debug!(error = %e, "Idle revert request dropped");
            }
        }));
    }

    /// Cancel any running countdown
    pub fn disarm(&mut self) {
        self.cancel_countdown();
        self.generation += 1;
    }

    /// Arm with the configured timeout while the standing mode is non-default,
    /// disarm otherwise.
    pub fn refresh(&mut self, in_default_mode: bool) {
        match self.timeout {
            Some(timeout) if !in_default_mode => self.arm(timeout),
            _ => self.disarm(),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.countdown.is_some()
    }

    /// Accept a revert request if it belongs to the live countdown. An accepted
    /// request disarms the reverter; stale requests are rejected.
    pub fn acknowledge(&mut self, request: RevertRequest) -> bool {
        if self.countdown.is_some() && request.generation == self.generation {
            self.countdown = None;
            true
        } else {
            false
        }
    }

    fn cancel_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }
}

impl Drop for IdleReverter {
    fn drop(&mut self) {
        self.cancel_countdown();
    }
}
