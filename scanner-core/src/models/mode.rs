//! Mode definitions
//!
//! `ModeRecord` is the shape of a mode as written in a YAML file; `ModeDefinition`
//! is the validated, immutable form the rest of the crate works with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Header every request carries unless a mode overrides it
pub const DEFAULT_CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

/// HTTP verbs a mode may dispatch with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Whether the payload is sent as a JSON body. Every other verb flattens
    /// the payload into query parameters.
    pub fn carries_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => Err(format!("unsupported HTTP method: {}", other)),
        }
    }
}

/// A list field that may also be written as a single string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Mode as written in a definition file
#[derive(Debug, Clone, Deserialize)]
pub struct ModeRecord {
    pub name: String,
    pub endpoint: String,
    #[serde(default)]
    pub method: Option<String>,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub header: Option<BTreeMap<String, String>>,
    /// Exact tokens that switch to this mode persistently
    #[serde(default)]
    pub trigger: Option<OneOrMany>,
    /// Prefixes that route a single scan to this mode
    #[serde(default)]
    pub prefix_trigger: Option<OneOrMany>,
    #[serde(default)]
    pub strip_prefix: bool,
    #[serde(default)]
    pub enable_input: bool,
    #[serde(default = "default_true")]
    pub eval_mathops: bool,
    #[serde(default)]
    pub enable_trigger_req: bool,
}

/// Validated mode definition, immutable after load
#[derive(Debug, Clone, PartialEq)]
pub struct ModeDefinition {
    pub name: String,
    pub endpoint: Url,
    pub method: HttpMethod,
    pub timeout: Option<Duration>,
    /// Request headers with the default content type already merged in
    pub headers: BTreeMap<String, String>,
    pub exact_triggers: Vec<String>,
    pub prefix_triggers: Vec<String>,
    pub strip_prefix: bool,
    pub enable_input: bool,
    pub eval_math_ops: bool,
    pub enable_trigger_request: bool,
}

impl ModeDefinition {
    /// Minimal POST mode with no triggers. Mostly useful for building catalogs in code.
    pub fn new(name: impl Into<String>, endpoint: Url) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            DEFAULT_CONTENT_TYPE.0.to_string(),
            DEFAULT_CONTENT_TYPE.1.to_string(),
        );
        Self {
            name: name.into(),
            endpoint,
            method: HttpMethod::Post,
            timeout: None,
            headers,
            exact_triggers: Vec::new(),
            prefix_triggers: Vec::new(),
            strip_prefix: false,
            enable_input: false,
            eval_math_ops: true,
            enable_trigger_request: false,
        }
    }

    /// Merge `extra` over the current headers. Names compare case-insensitively,
    /// so a mode's `content-type` replaces the default `Content-Type`.
    pub fn merge_headers(&mut self, extra: BTreeMap<String, String>) {
        for (name, value) in extra {
            self.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
            self.headers.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!(" Get ".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert!("FETCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_body_capable_methods() {
        assert!(HttpMethod::Post.carries_body());
        assert!(HttpMethod::Put.carries_body());
        assert!(HttpMethod::Patch.carries_body());
        assert!(!HttpMethod::Get.carries_body());
        assert!(!HttpMethod::Delete.carries_body());
    }

    #[test]
    fn test_merge_headers_replaces_content_type() {
        let mut mode = ModeDefinition::new("A", Url::parse("http://localhost/a").unwrap());
        let mut extra = BTreeMap::new();
        extra.insert("content-type".to_string(), "text/plain".to_string());
        extra.insert("X-Api-Key".to_string(), "secret".to_string());
        mode.merge_headers(extra);

        assert_eq!(mode.headers.len(), 2);
        assert_eq!(mode.headers.get("content-type").unwrap(), "text/plain");
        assert!(!mode.headers.contains_key("Content-Type"));
    }

    #[test]
    fn test_record_defaults() {
        let record: ModeRecord = serde_yaml::from_str(
            "name: STOCK\nendpoint: http://localhost/stock\nprefix_trigger: \"S-\"\n",
        )
        .unwrap();
        assert!(record.eval_mathops);
        assert!(!record.enable_input);
        assert_eq!(
            record.prefix_trigger.unwrap().into_vec(),
            vec!["S-".to_string()]
        );
    }
}
