//! Scan pipeline
//!
//! One sequential loop: read a token, classify it, optionally capture
//! supplemental input, dispatch, then re-arm the idle reverter. Requests go
//! out strictly in scan order and the next token is not read until the
//! previous dispatch finished. Idle reverts arrive on a channel and are
//! applied between reads, so mode state has a single writer.

pub mod input;
pub mod sanitize;

pub use input::{spawn_line_reader, spawn_stdin_reader};
pub use sanitize::sanitize_input;

use crate::console::Console;
use crate::expression::{evaluate, EvaluatedResult};
use crate::models::{ModeDefinition, OutgoingPayload};
use crate::services::logging;
use crate::state::{
    Classification, IdleReverter, ModeStateMachine, RevertOutcome, RevertRequest, ScanEvent,
};
use crate::transport::{DispatchRequest, HttpTransport};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const REVERT_REASON: &str = "inactivity";

/// Why the pipeline stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    EndOfInput,
    Interrupted,
}

/// Result of a single HTTP dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 2xx response
    Sent { status: u16 },
    /// Non-2xx response
    Rejected { status: u16, body: String },
    /// No response (network error, timeout)
    Failed { error: String },
}

enum Next {
    Revert(RevertRequest),
    Line(Option<String>),
}

pub struct ScanPipeline<T: HttpTransport, W: Write> {
    machine: ModeStateMachine,
    reverter: IdleReverter,
    reverts: mpsc::Receiver<RevertRequest>,
    lines: mpsc::Receiver<String>,
    transport: T,
    console: Console<W>,
}

impl<T: HttpTransport, W: Write> ScanPipeline<T, W> {
    pub fn new(
        machine: ModeStateMachine,
        idle_timeout: Option<Duration>,
        lines: mpsc::Receiver<String>,
        transport: T,
        out: W,
    ) -> Self {
        let (reverter, reverts) = IdleReverter::new(idle_timeout);
        Self {
            machine,
            reverter,
            reverts,
            lines,
            transport,
            console: Console::new(out),
        }
    }

    pub fn machine(&self) -> &ModeStateMachine {
        &self.machine
    }

    pub fn is_idle_timer_armed(&self) -> bool {
        self.reverter.is_armed()
    }

    pub fn into_output(self) -> W {
        self.console.into_inner()
    }

    /// Process input until it ends or `shutdown` completes. An interrupt
    /// abandons any in-flight dispatch.
    pub async fn run<F>(&mut self, shutdown: F) -> ExitReason
    where
        F: Future<Output = ()>,
    {
        let current = self.machine.current_mode().name.clone();
        logging::log_startup(&current, &self.machine.catalog().names());
        self.console.ready(&current);

        let reason = tokio::select! {
            reason = self.run_loop() => reason,
            _ = shutdown => ExitReason::Interrupted,
        };

        self.reverter.disarm();
        if reason == ExitReason::Interrupted {
            self.console.exiting();
        }
        logging::log_shutdown(&self.machine.current_mode().name);
        reason
    }

    async fn run_loop(&mut self) -> ExitReason {
        let mut show_prompt = true;
        loop {
            if show_prompt {
                let mode = self.machine.current_mode().name.clone();
                self.console.prompt(&mode);
                show_prompt = false;
            }

            let next = tokio::select! {
                biased;
                Some(request) = self.reverts.recv() => Next::Revert(request),
                line = self.lines.recv() => Next::Line(line),
            };

            match next {
                Next::Revert(request) => {
                    if self.apply_revert(request) {
                        show_prompt = true;
                    }
                }
                Next::Line(None) => {
                    logging::log_stdin_eof();
                    return ExitReason::EndOfInput;
                }
                Next::Line(Some(line)) => {
                    self.process_line(&line).await;
                    show_prompt = true;
                }
            }
        }
    }

    /// Handle one input line. Returns the dispatches it produced, in order.
    pub async fn process_line(&mut self, line: &str) -> Vec<DispatchOutcome> {
        let token = sanitize_input(line).trim().to_string();
        if token.is_empty() {
            return Vec::new();
        }

        let mut event = self.machine.on_token(&token);
        let mode = Arc::clone(&event.resolved_mode);
        let mut outcomes = Vec::new();

        match event.classification {
            Classification::ExactSwitch => {
                self.console.switched(&mode.name);
                logging::log_mode_switch(&mode.name, &event.raw_token);
                if event.send_trigger_request {
                    let payload = OutgoingPayload::mode_switch(&event.raw_token, &mode.name);
                    outcomes.push(self.dispatch(&mode, payload).await);
                }
                self.reverter.refresh(self.machine.is_default());
            }
            Classification::PrefixOverride | Classification::PlainScan => {
                if mode.enable_input {
                    event.supplemental_input = self.capture_input(&mode).await;
                }
                let payload = build_payload(&event);
                outcomes.push(self.dispatch(&mode, payload).await);
                // a one-scan override says nothing about the standing mode
                if event.classification == Classification::PlainScan {
                    self.reverter.refresh(self.machine.is_default());
                }
            }
        }

        outcomes
    }

    /// Apply an idle revert if it came from the live countdown
    fn apply_revert(&mut self, request: RevertRequest) -> bool {
        if !self.reverter.acknowledge(request) {
            tracing::debug!(generation = request.generation, "Ignoring stale idle revert");
            return false;
        }
        match self.machine.on_idle_revert() {
            RevertOutcome::Reverted { to_mode } => {
                self.console.reverted(&to_mode, REVERT_REASON);
                logging::log_auto_revert(&to_mode, REVERT_REASON);
                true
            }
            RevertOutcome::AlreadyDefault => {
                tracing::debug!("Idle revert skipped, already in default mode");
                false
            }
        }
    }

    /// Read one line of operator input. Empty input (or end of input) yields None.
    async fn capture_input(&mut self, mode: &ModeDefinition) -> Option<EvaluatedResult> {
        self.console.input_prompt();
        let line = self.lines.recv().await?;
        let text = sanitize_input(line.trim());
        if text.is_empty() {
            return None;
        }
        if mode.eval_math_ops {
            Some(evaluate(&text))
        } else {
            Some(EvaluatedResult::Raw(text))
        }
    }

    async fn dispatch(&mut self, mode: &ModeDefinition, payload: OutgoingPayload) -> DispatchOutcome {
        let request = DispatchRequest::for_mode(mode, payload);
        let method = mode.method.as_str();
        let endpoint = mode.endpoint.as_str();

        match self.transport.send(&request).await {
            Ok(response) if response.is_success() => {
                self.console
                    .sent(method, response.status, endpoint, &request.payload);
                logging::log_sent(
                    &mode.name,
                    endpoint,
                    method,
                    response.status,
                    &request.payload.to_json(),
                );
                DispatchOutcome::Sent {
                    status: response.status,
                }
            }
            Ok(response) => {
                self.console
                    .rejected(method, response.status, &request.payload, &response.body);
                logging::log_error_response(
                    &mode.name,
                    endpoint,
                    method,
                    response.status,
                    &response.body,
                );
                DispatchOutcome::Rejected {
                    status: response.status,
                    body: response.body,
                }
            }
            Err(e) => {
                let error = e.to_string();
                self.console.failed(&error);
                logging::log_exception(&mode.name, method, &error);
                DispatchOutcome::Failed { error }
            }
        }
    }
}

/// Build the wire payload for a scan (prefix override or plain scan)
pub fn build_payload(event: &ScanEvent) -> OutgoingPayload {
    let mut payload = OutgoingPayload::scan(event.barcode(), &event.resolved_mode.name);
    if event.barcode() != event.raw_token {
        payload = payload.with_raw_barcode(&event.raw_token);
    }
    if let Some(input) = &event.supplemental_input {
        payload = payload.with_input(sanitize_input(&input.to_string()));
    }
    payload
}
