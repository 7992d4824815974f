//! State export/import payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::AppState;

/// Versioned full-state export envelope.
///
/// `analytics` is carried as an opaque value so the envelope does not pin
/// the log's record format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportPayload {
    pub version: String,
    #[serde(default = "Utc::now")]
    pub export_date: DateTime<Utc>,
    pub state: AppState,
    #[serde(default)]
    pub analytics: serde_json::Value,
}

impl ExportPayload {
    /// Parse and validate an export payload.
    ///
    /// `version` and `state` must be present or the payload is rejected;
    /// everything else falls back to defaults, so older exports with
    /// missing state fields import cleanly.
    pub fn parse(json: &str) -> Result<Self, CoreError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|err| CoreError::InvalidImport(format!("not valid JSON: {err}")))?;
        let object = value
            .as_object()
            .ok_or_else(|| CoreError::InvalidImport("payload is not an object".into()))?;
        if !object.contains_key("version") {
            return Err(CoreError::InvalidImport("missing `version`".into()));
        }
        if !object.contains_key("state") {
            return Err(CoreError::InvalidImport("missing `state`".into()));
        }
        serde_json::from_value(value).map_err(|err| CoreError::InvalidImport(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_missing_state() {
        let err = ExportPayload::parse(r#"{"version": "0.1.0"}"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidImport(_)));
    }

    #[test]
    fn parse_rejects_missing_version() {
        let err = ExportPayload::parse(r#"{"state": {}}"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidImport(_)));
    }

    #[test]
    fn parse_rejects_non_object_payloads() {
        assert!(ExportPayload::parse("[1, 2]").is_err());
        assert!(ExportPayload::parse("not json").is_err());
    }

    #[test]
    fn parse_accepts_minimal_payload() {
        let payload = ExportPayload::parse(r#"{"version": "0.1.0", "state": {}}"#).unwrap();
        assert_eq!(payload.version, "0.1.0");
        assert_eq!(payload.state.priorities.len(), 3);
        assert!(payload.analytics.is_null());
    }

    #[test]
    fn envelope_roundtrips() {
        let payload = ExportPayload {
            version: "0.1.0".into(),
            export_date: Utc::now(),
            state: AppState::default(),
            analytics: serde_json::json!([{"name": "focus_completed"}]),
        };
        let json = serde_json::to_string(&payload).unwrap();
        let parsed = ExportPayload::parse(&json).unwrap();
        assert_eq!(parsed.state, payload.state);
        assert_eq!(parsed.analytics, payload.analytics);
    }
}
