//! Mode state machine
//!
//! Holds the current and default mode and resolves every incoming token to a
//! dispatch decision. Only exact triggers and idle reverts change the current
//! mode; prefix overrides affect a single dispatch.

use crate::catalog::{CatalogError, ModeCatalog};
use crate::expression::EvaluatedResult;
use crate::models::ModeDefinition;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// How a token was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Exact trigger: persistent switch
    ExactSwitch,
    /// Prefix trigger: one-scan override
    PrefixOverride,
    /// Routed to the current mode
    PlainScan,
}

/// Decision for one input token
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEvent {
    pub raw_token: String,
    pub classification: Classification,
    /// Mode used for this dispatch (the new current mode for a switch)
    pub resolved_mode: Arc<ModeDefinition>,
    /// Prefix that routed the token, for prefix overrides
    pub matched_prefix: Option<String>,
    /// Token with the prefix removed, when the target mode strips prefixes
    pub stripped_barcode: Option<String>,
    /// Switch should be announced to the target endpoint
    pub send_trigger_request: bool,
    /// Filled in by the pipeline when the mode asks for input
    pub supplemental_input: Option<EvaluatedResult>,
}

impl ScanEvent {
    /// Barcode value to dispatch
    pub fn barcode(&self) -> &str {
        self.stripped_barcode.as_deref().unwrap_or(&self.raw_token)
    }

    pub fn is_persistent_switch(&self) -> bool {
        self.classification == Classification::ExactSwitch
    }
}

/// Result of an idle revert request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertOutcome {
    Reverted { to_mode: String },
    AlreadyDefault,
}

/// Mutable runtime state, owned by the state machine
#[derive(Debug, Clone)]
pub struct RuntimeState {
    pub current_mode: Arc<ModeDefinition>,
    pub default_mode: Arc<ModeDefinition>,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ModeStateMachine {
    catalog: Arc<ModeCatalog>,
    state: RuntimeState,
}

impl ModeStateMachine {
    /// Start in `default_mode`, which must exist in the catalog
    pub fn new(catalog: Arc<ModeCatalog>, default_mode: &str) -> Result<Self, CatalogError> {
        let default_mode = Arc::clone(catalog.require(default_mode)?);
        Ok(Self {
            catalog,
            state: RuntimeState {
                current_mode: Arc::clone(&default_mode),
                default_mode,
                last_activity: Utc::now(),
            },
        })
    }

    /// Classify `token` against the catalog without touching state.
    ///
    /// Exact triggers win over prefixes, even when a prefix equals the whole
    /// token; among prefixes the first declared wins.
    pub fn classify(&self, token: &str) -> ScanEvent {
        if let Some(target) = self.catalog.resolve_exact(token) {
            return ScanEvent {
                raw_token: token.to_string(),
                classification: Classification::ExactSwitch,
                resolved_mode: Arc::clone(target),
                matched_prefix: None,
                stripped_barcode: None,
                send_trigger_request: target.enable_trigger_request,
                supplemental_input: None,
            };
        }

        if let Some((target, prefix)) = self.catalog.resolve_prefix(token) {
            let stripped_barcode = target
                .strip_prefix
                .then(|| token[prefix.len()..].to_string());
            return ScanEvent {
                raw_token: token.to_string(),
                classification: Classification::PrefixOverride,
                resolved_mode: Arc::clone(target),
                matched_prefix: Some(prefix.to_string()),
                stripped_barcode,
                send_trigger_request: false,
                supplemental_input: None,
            };
        }

        ScanEvent {
            raw_token: token.to_string(),
            classification: Classification::PlainScan,
            resolved_mode: Arc::clone(&self.state.current_mode),
            matched_prefix: None,
            stripped_barcode: None,
            send_trigger_request: false,
            supplemental_input: None,
        }
    }

    /// Classify `token` and apply any persistent switch it carries
    pub fn on_token(&mut self, token: &str) -> ScanEvent {
        let event = self.classify(token);
        if event.is_persistent_switch() {
            self.state.current_mode = Arc::clone(&event.resolved_mode);
        }
        self.state.last_activity = Utc::now();
        event
    }

    /// Return to the default mode after inactivity
    pub fn on_idle_revert(&mut self) -> RevertOutcome {
        if self.is_default() {
            return RevertOutcome::AlreadyDefault;
        }
        self.state.current_mode = Arc::clone(&self.state.default_mode);
        RevertOutcome::Reverted {
            to_mode: self.state.default_mode.name.clone(),
        }
    }

    pub fn current_mode(&self) -> &Arc<ModeDefinition> {
        &self.state.current_mode
    }

    pub fn default_mode(&self) -> &Arc<ModeDefinition> {
        &self.state.default_mode
    }

    pub fn is_default(&self) -> bool {
        self.state.current_mode.name == self.state.default_mode.name
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.state.last_activity
    }

    pub fn catalog(&self) -> &ModeCatalog {
        &self.catalog
    }
}
