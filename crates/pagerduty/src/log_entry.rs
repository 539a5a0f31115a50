//! Log entries: the read-only audit trail of actions taken on an incident.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::ApiObject;

/// How an action reached PagerDuty (`api`, `email`, `web_trigger`, ...).
///
/// Channel payloads vary by type, so everything but `type` is kept raw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Remaining channel fields
    #[serde(flatten)]
    pub raw: Map<String, Value>,
}

/// A link, image or text attached to a log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Context type: `link`, `image` or `text`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Alternate text of an image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Link target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Image source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Link text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// An entry in an incident's log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// ID, type (e.g. `acknowledge_log_entry`), summary and links
    #[serde(flatten)]
    pub object: ApiObject,
    /// When the action happened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Who or what performed the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<ApiObject>,
    /// How the action was performed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    /// Service of the incident
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ApiObject>,
    /// Incident the entry belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident: Option<ApiObject>,
    /// Teams involved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<ApiObject>,
    /// Attached contexts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<Context>,
    /// Seconds until an acknowledgement times out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledgement_timeout: Option<u64>,
    /// Event details of trigger entries
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub event_details: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_trigger_entry() {
        let entry: LogEntry = serde_json::from_value(json!({
            "id": "Q02JTSNZWHSEKV",
            "type": "trigger_log_entry",
            "summary": "Triggered through the API",
            "created_at": "2015-11-07T00:14:20Z",
            "agent": {"id": "PRORDTY", "type": "service_reference"},
            "channel": {"type": "api", "service_key": "abc", "details": {"cpu": 99}},
            "incident": {"id": "PT4KHLK", "type": "incident_reference"},
            "teams": [],
            "contexts": [{"type": "link", "href": "https://example.com", "text": "runbook"}],
            "event_details": {"description": "CPU high"}
        }))
        .unwrap();

        assert_eq!(entry.object.kind.as_deref(), Some("trigger_log_entry"));
        assert_eq!(entry.created_at.unwrap().to_rfc3339(), "2015-11-07T00:14:20+00:00");
        let channel = entry.channel.unwrap();
        assert_eq!(channel.kind.as_deref(), Some("api"));
        assert_eq!(channel.raw["details"], json!({"cpu": 99}));
        assert!(entry.teams.is_empty());
        assert_eq!(entry.contexts[0].text.as_deref(), Some("runbook"));
        assert_eq!(entry.event_details["description"], "CPU high");
    }

    #[test]
    fn minimal_entry_decodes() {
        let entry: LogEntry = serde_json::from_value(json!({"id": "R1"})).unwrap();
        assert_eq!(entry.object.id.as_deref(), Some("R1"));
        assert!(entry.channel.is_none());
        assert!(entry.event_details.is_empty());
    }
}
