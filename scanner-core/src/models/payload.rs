//! Wire payload sent for every dispatch

use serde::{Deserialize, Serialize};

/// What a dispatch represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "scan")]
    Scan,
    #[serde(rename = "scan+input")]
    ScanWithInput,
    #[serde(rename = "mode")]
    Mode,
}

/// Body (or query parameters) of an outgoing request. Built once per dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingPayload {
    pub barcode: String,
    pub mode: String,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

impl OutgoingPayload {
    pub fn scan(barcode: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            barcode: barcode.into(),
            mode: mode.into(),
            action: Action::Scan,
            raw_barcode: None,
            input: None,
        }
    }

    /// Payload announcing a persistent switch; the barcode is the trigger itself.
    pub fn mode_switch(trigger: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            action: Action::Mode,
            ..Self::scan(trigger, mode)
        }
    }

    pub fn with_raw_barcode(mut self, raw: impl Into<String>) -> Self {
        self.raw_barcode = Some(raw.into());
        self
    }

    /// Attach supplemental input, which turns the action into `scan+input`.
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self.action = Action::ScanWithInput;
        self
    }

    /// Compact JSON rendering used in logs and console output
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
