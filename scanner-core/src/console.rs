//! Operator-facing console output
//!
//! Human feedback for the person holding the scanner. Write failures are
//! ignored; a broken terminal must not stop scans from being routed.

use crate::models::OutgoingPayload;
use crossterm::style::Stylize;
use std::io::Write;

pub const INPUT_PROMPT: &str = ">>> INPUT";

pub struct Console<W: Write> {
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn banner(&mut self, version: &str) {
        let _ = writeln!(
            self.out,
            "{}",
            format!("*** SCANNER CLI v{} ***", version).yellow()
        );
    }

    pub fn ready(&mut self, mode: &str) {
        let _ = writeln!(
            self.out,
            "Starting in mode {}. Ready for scans (Ctrl+C to exit)...",
            mode.bold()
        );
    }

    /// `[MODE] ` before each read
    pub fn prompt(&mut self, mode: &str) {
        let _ = write!(self.out, "[{}] ", mode.green());
        let _ = self.out.flush();
    }

    pub fn input_prompt(&mut self) {
        let _ = write!(self.out, "{} ", INPUT_PROMPT);
        let _ = self.out.flush();
    }

    pub fn switched(&mut self, mode: &str) {
        let _ = writeln!(self.out, "Switched mode to {}", mode.green());
    }

    pub fn reverted(&mut self, mode: &str, reason: &str) {
        let _ = writeln!(
            self.out,
            "\n{}",
            format!("Mode auto-reverted to {} ({})", mode, reason).yellow()
        );
    }

    pub fn sent(&mut self, method: &str, status: u16, endpoint: &str, payload: &OutgoingPayload) {
        let _ = writeln!(
            self.out,
            "{} -> {} {}",
            format!("{} {}", method, status).green(),
            endpoint,
            payload.to_json()
        );
    }

    pub fn rejected(&mut self, method: &str, status: u16, payload: &OutgoingPayload, body: &str) {
        let _ = writeln!(
            self.out,
            "{} {}: {}",
            format!("{} {}", method, status).red(),
            payload.to_json(),
            body
        );
    }

    pub fn failed(&mut self, error: &str) {
        let _ = writeln!(self.out, "{}: {}", "Request failed".red(), error);
    }

    pub fn exiting(&mut self) {
        let _ = writeln!(self.out, "\nExiting.");
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
