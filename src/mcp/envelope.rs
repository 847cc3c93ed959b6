//! Response envelopes
//!
//! Success: `{"status": ..., <payload fields>, "timestamp": <RFC 3339>}`.
//! Failure: `{"error": "<message>"}` with no status and no timestamp; the
//! asymmetry is part of the tool contract.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::OdooError;

/// Current time as RFC 3339 / ISO-8601, UTC
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `status: "success"` envelope around `payload`
pub fn success(payload: Map<String, Value>) -> Value {
    with_status("success", payload)
}

/// Success-shaped envelope with a caller-chosen status (`ok`, `warning`, ...)
pub fn with_status(status: &str, payload: Map<String, Value>) -> Value {
    let mut envelope = payload;
    envelope.insert("status".into(), Value::String(status.to_string()));
    envelope.insert("timestamp".into(), Value::String(timestamp()));
    Value::Object(envelope)
}

/// `{"error": message}`
pub fn error(message: impl Into<String>) -> Value {
    let mut envelope = Map::new();
    envelope.insert("error".into(), Value::String(message.into()));
    Value::Object(envelope)
}

/// Wrap any outcome; `context` prefixes failure messages, e.g. "Error searching"
pub fn normalize(outcome: Result<Map<String, Value>, OdooError>, context: &str) -> Value {
    match outcome {
        Ok(payload) => success(payload),
        Err(err) => error(format!("{}: {}", context, err)),
    }
}

/// True for the `{"error": ...}` shape
pub fn is_error(envelope: &Value) -> bool {
    envelope.get("error").is_some() && envelope.get("status").is_none()
}
