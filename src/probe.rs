//! API probe: a single GET against the bridge endpoint and a verdict on the reply.
//!
//! The probe never retries. Transport problems come back as `Err`, anything
//! the server actually answered comes back as a [`ProbeReport`] whose
//! [`Verdict`] says how the answer should be read.

use crate::{Config, Error, Result};
use log::{debug, info};
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Key the bridge puts the shortened link under
pub const SHORTENED_URL_KEY: &str = "shortenedUrl";

/// How a bridge reply should be read
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// Status 200 and the body carries `shortenedUrl` (value not inspected)
    Success { shortened_url: Value },
    /// Status 200 and valid JSON, but no `shortenedUrl`
    PartialSuccess,
    /// Any status other than 200; the body is not looked at
    Failure { status: u16 },
    /// Status 200 but the body is not JSON
    MalformedBody { reason: String },
}

impl Verdict {
    /// Whether the bridge produced a shortened link
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success { .. })
    }

    /// Operator-facing verdict line
    pub fn message(&self) -> String {
        match self {
            Verdict::Success { .. } => format!("SUCCESS: '{}' found in response.", SHORTENED_URL_KEY),
            Verdict::PartialSuccess => {
                format!("PARTIAL SUCCESS: JSON returned but missing '{}'.", SHORTENED_URL_KEY)
            }
            Verdict::Failure { .. } => "FAILURE: Non-200 status code.".to_string(),
            Verdict::MalformedBody { reason } => format!("Error: {}", reason),
        }
    }
}

/// Everything the probe learned from one request
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// Full request URL including the query string
    pub endpoint: String,
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
    pub verdict: Verdict,
}

impl ProbeReport {
    /// The `error` message of a JSON error body, when the server sent one.
    pub fn error_detail(&self) -> Option<String> {
        match serde_json::from_str::<Value>(&self.body) {
            Ok(Value::Object(map)) => map.get("error").map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            _ => None,
        }
    }
}

/// Decide the verdict for a reply. Only key presence is checked.
pub fn classify(status: u16, body: &str) -> Verdict {
    if status != 200 {
        return Verdict::Failure { status };
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get(SHORTENED_URL_KEY) {
            Some(v) => Verdict::Success { shortened_url: v.clone() },
            None => Verdict::PartialSuccess,
        },
        // Arrays, strings and numbers are JSON too, just not the expected shape
        Ok(_) => Verdict::PartialSuccess,
        Err(e) => Verdict::MalformedBody { reason: e.to_string() },
    }
}

/// Build `<base_url>/api/bridge?api=..&url=..&provider=..`
pub fn endpoint(config: &Config) -> Result<Url> {
    let raw = format!("{}/api/bridge", config.base_url.trim_end_matches('/'));
    Url::parse_with_params(&raw, config.bridge.pairs())
        .map_err(|e| Error::ConfigError(format!("Invalid endpoint '{}': {}", raw, e)))
}

/// Send the bridge request once and classify the reply.
pub fn probe(config: &Config) -> Result<ProbeReport> {
    config.validate_probe()?;
    let url = endpoint(config)?;
    let client = build_client(config)?;

    info!("Probing {}", url);
    let (status, body) = fetch(&client, &url, config.timeout_ms)?;
    debug!("Bridge replied {} with {} bytes", status, body.len());

    let verdict = classify(status, &body);
    if !verdict.is_success() {
        info!("Bridge probe did not succeed: {:?}", verdict);
    }

    Ok(ProbeReport {
        endpoint: url.to_string(),
        status,
        body,
        verdict,
    })
}

/// How a health reply should be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HealthVerdict {
    Healthy,
    Unhealthy { status: u16 },
    UnexpectedBody { reason: String },
}

impl HealthVerdict {
    pub fn message(&self) -> String {
        match self {
            HealthVerdict::Healthy => "HEALTHY: API is reachable.".to_string(),
            HealthVerdict::Unhealthy { .. } => "UNHEALTHY: Non-200 status code.".to_string(),
            HealthVerdict::UnexpectedBody { reason } => format!("UNEXPECTED: {}", reason),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub endpoint: String,
    pub status: u16,
    pub body: String,
    pub verdict: HealthVerdict,
}

/// Healthy means status 200 and a JSON body with `"status": "ok"`.
pub fn classify_health(status: u16, body: &str) -> HealthVerdict {
    if status != 200 {
        return HealthVerdict::Unhealthy { status };
    }

    match serde_json::from_str::<Value>(body) {
        Ok(v) => match v.get("status").and_then(Value::as_str) {
            Some("ok") => HealthVerdict::Healthy,
            Some(other) => HealthVerdict::UnexpectedBody {
                reason: format!("status is '{}'", other),
            },
            None => HealthVerdict::UnexpectedBody {
                reason: "missing 'status' field".to_string(),
            },
        },
        Err(e) => HealthVerdict::UnexpectedBody { reason: e.to_string() },
    }
}

/// GET `<base_url>/api/health` once.
pub fn health(config: &Config) -> Result<HealthReport> {
    config.validate_probe()?;
    let raw = format!("{}/api/health", config.base_url.trim_end_matches('/'));
    let url = Url::parse(&raw).map_err(|e| Error::ConfigError(format!("Invalid endpoint '{}': {}", raw, e)))?;
    let client = build_client(config)?;

    info!("Checking health at {}", url);
    let (status, body) = fetch(&client, &url, config.timeout_ms)?;
    let verdict = classify_health(status, &body);

    Ok(HealthReport {
        endpoint: url.to_string(),
        status,
        body,
        verdict,
    })
}

fn build_client(config: &Config) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .build()
        .map_err(|e| Error::InitializationError(format!("Failed to build HTTP client: {}", e)))
}

fn fetch(client: &Client, url: &Url, timeout_ms: u64) -> Result<(u16, String)> {
    let res = client
        .get(url.clone())
        .send()
        .map_err(|e| transport_error(e, timeout_ms))?;

    let status = res.status().as_u16();
    let body = res.text().map_err(|e| transport_error(e, timeout_ms))?;
    Ok((status, body))
}

fn transport_error(err: reqwest::Error, timeout_ms: u64) -> Error {
    if err.is_timeout() {
        Error::Timeout(timeout_ms)
    } else {
        Error::NetworkError(err.to_string())
    }
}
