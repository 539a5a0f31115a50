//! Incidents: normalized, de-duplicated events tracked from trigger to resolution.
use std::{fmt, str::FromStr};

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    client::{Client, decode_envelope, decode_json, from_headers},
    error::{ParseValueError, Result},
    log_entry::LogEntry,
    query::{Query, ToQuery},
    transport::Transport,
    types::{ApiDetails, ApiObject, ApiReference, ListObject, ListOptions},
};

/// Lifecycle state of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    /// Open and notifying responders.
    Triggered,
    /// A responder is working on it.
    Acknowledged,
    /// Closed.
    Resolved,
}

impl IncidentStatus {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Triggered => "triggered",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentStatus {
    type Err = ParseValueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "triggered" => Ok(Self::Triggered),
            "acknowledged" => Ok(Self::Acknowledged),
            "resolved" => Ok(Self::Resolved),
            other => Err(ParseValueError::new("incident status", other)),
        }
    }
}

/// How urgently responders are notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// High urgency
    High,
    /// Low urgency
    Low,
}

impl Urgency {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = ParseValueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            other => Err(ParseValueError::new("urgency", other)),
        }
    }
}

/// An acknowledgement of an incident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// When the incident was acknowledged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
    /// Who acknowledged it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledger: Option<ApiObject>,
}

/// An action scheduled to happen to an incident (e.g. auto-resolve).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    /// Action type: `unacknowledge`, `escalate`, `resolve` or `urgency_change`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// When it will happen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
}

/// An assignment of an incident to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// When the assignment was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
    /// Assigned user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<ApiObject>,
}

/// A PagerDuty incident.
///
/// Also used as the request item of [`Client::manage_incidents`]; build those
/// with [`Incident::acknowledge`], [`Incident::resolve`], [`Incident::escalate`]
/// or [`Incident::reassign`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// ID, type, summary and links
    #[serde(flatten)]
    pub object: ApiObject,
    /// Sequential number, unique within the account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_number: Option<u64>,
    /// Title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description (usually the title)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Current status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
    /// Current urgency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    /// De-duplication key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_key: Option<String>,
    /// Scheduled actions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_actions: Vec<PendingAction>,
    /// Impacted service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ApiObject>,
    /// Current assignments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignments: Vec<Assignment>,
    /// Current acknowledgements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acknowledgements: Vec<Acknowledgement>,
    /// Time of the last status change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status_change_at: Option<DateTime<Utc>>,
    /// Agent that made the last status change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status_change_by: Option<ApiObject>,
    /// Log entry that triggered the incident
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_trigger_log_entry: Option<ApiObject>,
    /// Escalation policy in effect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_policy: Option<ApiObject>,
    /// Escalation level, set to escalate the incident
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_level: Option<u32>,
    /// Teams involved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<ApiObject>,
    /// Priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ApiObject>,
}

impl Incident {
    /// `incident_reference` to the given incident, with nothing else set.
    pub fn reference(id: impl Into<String>) -> Self {
        Self { object: ApiObject::reference(id, "incident_reference"), ..Default::default() }
    }

    /// Manage-request item acknowledging the incident.
    pub fn acknowledge(id: impl Into<String>) -> Self {
        Self { status: Some(IncidentStatus::Acknowledged), ..Self::reference(id) }
    }

    /// Manage-request item resolving the incident.
    pub fn resolve(id: impl Into<String>) -> Self {
        Self { status: Some(IncidentStatus::Resolved), ..Self::reference(id) }
    }

    /// Manage-request item escalating the incident to `level`.
    pub fn escalate(id: impl Into<String>, level: u32) -> Self {
        Self { escalation_level: Some(level), ..Self::reference(id) }
    }

    /// Manage-request item reassigning the incident to the given users.
    pub fn reassign<I, S>(id: impl Into<String>, user_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let assignments = user_ids
            .into_iter()
            .map(|uid| Assignment { at: None, assignee: Some(ApiObject::reference(uid, "user_reference")) })
            .collect();
        Self { assignments, ..Self::reference(id) }
    }

    /// Incident ID, if present.
    pub fn id(&self) -> Option<&str> {
        self.object.id.as_deref()
    }
}

/// Response of [`Client::list_incidents`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListIncidentsResponse {
    /// Pagination metadata
    #[serde(flatten)]
    pub page: ListObject,
    /// Incidents on this page
    #[serde(default)]
    pub incidents: Vec<Incident>,
}

/// Filters and paging for [`Client::list_incidents`]. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListIncidentsOptions {
    /// Pagination
    pub list: ListOptions,
    /// Start of the date range
    pub since: Option<DateTime<Utc>>,
    /// End of the date range
    pub until: Option<DateTime<Utc>>,
    /// `all` to ignore `since`/`until`
    pub date_range: Option<String>,
    /// Only incidents with these statuses
    pub statuses: Vec<IncidentStatus>,
    /// Only incidents with this de-duplication key
    pub incident_key: Option<String>,
    /// Only incidents on these services
    pub service_ids: Vec<String>,
    /// Only incidents related to these teams
    pub team_ids: Vec<String>,
    /// Only incidents assigned to these users
    pub user_ids: Vec<String>,
    /// Only incidents with these urgencies
    pub urgencies: Vec<Urgency>,
    /// Time zone of the returned timestamps
    pub time_zone: Option<String>,
    /// Sort field and direction, e.g. `incident_number:asc`
    pub sort_by: Option<String>,
    /// Extra models to side-load, e.g. `acknowledgers`
    pub includes: Vec<String>,
}

fn format_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl ToQuery for ListIncidentsOptions {
    fn append_to(&self, query: &mut Query) {
        self.list.append_to(query);
        query
            .opt("since", self.since.map(format_time))
            .opt("until", self.until.map(format_time))
            .opt("date_range", self.date_range.as_deref())
            .list("statuses", &self.statuses)
            .opt("incident_key", self.incident_key.as_deref())
            .list("service_ids", &self.service_ids)
            .list("team_ids", &self.team_ids)
            .list("user_ids", &self.user_ids)
            .list("urgencies", &self.urgencies)
            .opt("time_zone", self.time_zone.as_deref())
            .opt("sort_by", self.sort_by.as_deref())
            .list("include", &self.includes);
    }
}

/// Body of [`Client::create_incident`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateIncidentOptions {
    /// Always `incident`
    #[serde(rename = "type")]
    pub kind: String,
    /// Incident title
    pub title: String,
    /// Service the incident belongs to
    pub service: ApiReference,
    /// Priority
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<ApiReference>,
    /// Urgency, defaults to the service's setting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    /// De-duplication key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_key: Option<String>,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ApiDetails>,
    /// Escalation policy overriding the service's
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_policy: Option<ApiReference>,
}

impl CreateIncidentOptions {
    /// New incident on `service` titled `title`.
    pub fn new(title: impl Into<String>, service: ApiReference) -> Self {
        Self {
            kind: "incident".to_owned(),
            title: title.into(),
            service,
            priority: None,
            urgency: None,
            incident_key: None,
            body: None,
            escalation_policy: None,
        }
    }
}

/// A note on an incident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentNote {
    /// Note ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ApiObject>,
    /// Text of the note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl IncidentNote {
    /// A note to be created with the given text.
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: Some(content.into()), ..Default::default() }
    }
}

/// Response of [`Client::list_incident_log_entries`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListIncidentLogEntriesResponse {
    /// Pagination metadata
    #[serde(flatten)]
    pub page: ListObject,
    /// Log entries on this page
    #[serde(default)]
    pub log_entries: Vec<LogEntry>,
}

/// Options for [`Client::list_incident_log_entries`]. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListIncidentLogEntriesOptions {
    /// Pagination
    pub list: ListOptions,
    /// Extra models to side-load
    pub includes: Vec<String>,
    /// Only return the most important changes
    pub is_overview: bool,
    /// Time zone of the returned timestamps
    pub time_zone: Option<String>,
}

impl ToQuery for ListIncidentLogEntriesOptions {
    fn append_to(&self, query: &mut Query) {
        self.list.append_to(query);
        query
            .list("include", &self.includes)
            .flag("is_overview", self.is_overview)
            .opt("time_zone", self.time_zone.as_deref());
    }
}

#[derive(Serialize)]
struct CreateIncidentRequest<'a> {
    incident: &'a CreateIncidentOptions,
}

#[derive(Serialize)]
struct ManageIncidentsRequest<'a> {
    incidents: &'a [Incident],
}

#[derive(Serialize)]
struct CreateNoteRequest<'a> {
    note: &'a IncidentNote,
}

#[derive(Serialize)]
struct SnoozeRequest {
    duration: u64,
}

impl<T: Transport> Client<T> {
    /// List incidents matching `options`.
    pub async fn list_incidents(&self, options: &ListIncidentsOptions) -> Result<ListIncidentsResponse> {
        let resp = self.get("/incidents", &options.to_query()).await?;
        decode_json(&resp)
    }

    /// Create an incident without a corresponding event from a monitoring service.
    ///
    /// `from` is the email of a valid user on the account.
    pub async fn create_incident(&self, from: &str, options: &CreateIncidentOptions) -> Result<Incident> {
        let body = CreateIncidentRequest { incident: options };
        let resp = self.post("/incidents", &body, from_headers(from)?).await?;
        let incident: Incident = decode_envelope(&resp, "incident")?;
        info!(incident_id = ?incident.id(), title = %options.title, "Created incident");
        Ok(incident)
    }

    /// Acknowledge, resolve, escalate or reassign incidents in one request.
    pub async fn manage_incidents(&self, from: &str, incidents: &[Incident]) -> Result<()> {
        let body = ManageIncidentsRequest { incidents };
        self.put("/incidents", &body, from_headers(from)?).await?;
        debug!(count = incidents.len(), "Managed incidents");
        Ok(())
    }

    /// Fetch one incident.
    pub async fn get_incident(&self, id: &str) -> Result<Incident> {
        let resp = self.get(&format!("/incidents/{id}"), &Query::new()).await?;
        decode_envelope(&resp, "incident")
    }

    /// List the notes of an incident.
    pub async fn list_incident_notes(&self, id: &str) -> Result<Vec<IncidentNote>> {
        let resp = self.get(&format!("/incidents/{id}/notes"), &Query::new()).await?;
        decode_envelope(&resp, "notes")
    }

    /// Add a note to an incident on behalf of `from`.
    pub async fn create_incident_note(&self, id: &str, from: &str, note: &IncidentNote) -> Result<()> {
        let body = CreateNoteRequest { note };
        self.post(&format!("/incidents/{id}/notes"), &body, from_headers(from)?).await?;
        Ok(())
    }

    /// Stop an acknowledged incident from re-triggering for `duration_secs`.
    pub async fn snooze_incident(&self, id: &str, duration_secs: u64) -> Result<()> {
        let body = SnoozeRequest { duration: duration_secs };
        self.post(&format!("/incidents/{id}/snooze"), &body, HeaderMap::new()).await?;
        debug!(incident_id = %id, duration_secs, "Snoozed incident");
        Ok(())
    }

    /// List the log entries of an incident.
    pub async fn list_incident_log_entries(
        &self,
        id: &str,
        options: &ListIncidentLogEntriesOptions,
    ) -> Result<ListIncidentLogEntriesResponse> {
        let resp = self.get(&format!("/incidents/{id}/log_entries"), &options.to_query()).await?;
        decode_json(&resp)
    }
}
