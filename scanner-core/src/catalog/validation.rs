//! Mode record validation
//!
//! Turns a `ModeRecord` read from disk into a `ModeDefinition`, rejecting
//! anything that would otherwise fail at dispatch time.

use crate::models::{HttpMethod, ModeDefinition, ModeRecord};
use reqwest::header::{HeaderName, HeaderValue};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while loading or validating the mode catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Modes directory {} does not exist", .0.display())]
    ModesDirMissing(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{} must contain a mode mapping or a list of mode mappings", .path.display())]
    InvalidFile { path: PathBuf },

    #[error("Mode name is empty")]
    EmptyName,

    #[error("Mode '{0}' is defined more than once")]
    DuplicateMode(String),

    #[error("Trigger '{trigger}' is declared by both '{first}' and '{second}'")]
    DuplicateTrigger {
        trigger: String,
        first: String,
        second: String,
    },

    #[error("Mode '{0}' declares an empty trigger")]
    EmptyTrigger(String),

    #[error("Mode '{0}' declares an empty prefix trigger")]
    EmptyPrefix(String),

    #[error("Mode '{mode}' uses an unsupported HTTP method: {method}")]
    UnknownMethod { mode: String, method: String },

    #[error("Mode '{mode}' has an invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        mode: String,
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Mode '{mode}' has an invalid header '{header}'")]
    InvalidHeader { mode: String, header: String },

    #[error("Default mode {name} not found. Available: [{}]", .available.join(", "))]
    UnknownDefaultMode {
        name: String,
        available: Vec<String>,
    },
}

/// Validate a raw record and build the immutable definition
pub fn validate_record(record: ModeRecord) -> Result<ModeDefinition, CatalogError> {
    let name = record.name.trim().to_string();
    if name.is_empty() {
        return Err(CatalogError::EmptyName);
    }

    let endpoint = Url::parse(record.endpoint.trim()).map_err(|source| {
        CatalogError::InvalidEndpoint {
            mode: name.clone(),
            endpoint: record.endpoint.clone(),
            source,
        }
    })?;

    let method = match record.method.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            raw.parse::<HttpMethod>().map_err(|_| CatalogError::UnknownMethod {
                mode: name.clone(),
                method: raw.to_string(),
            })?
        }
        _ => HttpMethod::default(),
    };

    let mut definition = ModeDefinition::new(name.clone(), endpoint);
    definition.method = method;
    // zero means "use the client-wide default"
    definition.timeout = record
        .timeout
        .filter(|&seconds| seconds > 0)
        .map(Duration::from_secs);

    if let Some(headers) = record.header {
        for (header, value) in &headers {
            let valid = HeaderName::from_bytes(header.as_bytes()).is_ok()
                && HeaderValue::from_str(value).is_ok();
            if !valid {
                return Err(CatalogError::InvalidHeader {
                    mode: name.clone(),
                    header: header.clone(),
                });
            }
        }
        definition.merge_headers(headers);
    }

    for trigger in record.trigger.map(|t| t.into_vec()).unwrap_or_default() {
        if trigger.is_empty() {
            return Err(CatalogError::EmptyTrigger(name));
        }
        if !definition.exact_triggers.contains(&trigger) {
            definition.exact_triggers.push(trigger);
        }
    }

    for prefix in record.prefix_trigger.map(|p| p.into_vec()).unwrap_or_default() {
        if prefix.is_empty() {
            return Err(CatalogError::EmptyPrefix(name));
        }
        if !definition.prefix_triggers.contains(&prefix) {
            definition.prefix_triggers.push(prefix);
        }
    }

    definition.strip_prefix = record.strip_prefix;
    definition.enable_input = record.enable_input;
    definition.eval_math_ops = record.eval_mathops;
    definition.enable_trigger_request = record.enable_trigger_req;

    Ok(definition)
}
