//! Shapes shared by every PagerDuty resource.
use serde::{Deserialize, Serialize};

use crate::query::{Query, ToQuery};

/// Common fields of any object returned by the API, also used as a reference to
/// another object (service, user, escalation policy, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiObject {
    /// Object ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Object type (e.g. `service_reference`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Short human readable summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// API URL of the object
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    /// Web UI URL of the object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

impl ApiObject {
    /// A bare `{id, type}` reference.
    pub fn reference(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { id: Some(id.into()), kind: Some(kind.into()), ..Default::default() }
    }
}

/// A mandatory `{id, type}` reference used in request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiReference {
    /// Referenced object ID
    pub id: String,
    /// Reference type (e.g. `service_reference`)
    #[serde(rename = "type")]
    pub kind: String,
}

impl ApiReference {
    /// Create a reference of an arbitrary type.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { id: id.into(), kind: kind.into() }
    }

    /// `service_reference`
    pub fn service(id: impl Into<String>) -> Self {
        Self::new(id, "service_reference")
    }

    /// `priority_reference`
    pub fn priority(id: impl Into<String>) -> Self {
        Self::new(id, "priority_reference")
    }

    /// `escalation_policy_reference`
    pub fn escalation_policy(id: impl Into<String>) -> Self {
        Self::new(id, "escalation_policy_reference")
    }
}

/// Free-form details attached to an object (e.g. an incident body).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDetails {
    /// Details type (e.g. `incident_body`)
    #[serde(rename = "type")]
    pub kind: String,
    /// Details text
    pub details: String,
}

impl ApiDetails {
    /// An `incident_body` with the given text.
    pub fn incident_body(details: impl Into<String>) -> Self {
        Self { kind: "incident_body".to_owned(), details: details.into() }
    }
}

/// Pagination metadata returned alongside every list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListObject {
    /// Offset of the first returned record
    #[serde(default)]
    pub offset: u32,
    /// Page size used by the server
    #[serde(default)]
    pub limit: u32,
    /// Whether more records are available past this page
    #[serde(default)]
    pub more: bool,
    /// Total record count, only populated when requested with `total=true`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl ListObject {
    /// Offset of the page following this one, if the server reported more records.
    ///
    /// `None` when the response carries no page size to advance by.
    pub const fn next_offset(&self) -> Option<u32> {
        if !self.more || self.limit == 0 {
            return None;
        }
        self.offset.checked_add(self.limit)
    }
}

/// Pagination parameters of a list request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Page size
    pub limit: Option<u32>,
    /// Offset of the first record to return
    pub offset: Option<u32>,
    /// Ask the server to compute `total`
    pub total: bool,
}

impl ListOptions {
    /// Options for the page that follows `page`, keeping the same page size.
    ///
    /// Falls back to the requested offset and limit when the response omits them.
    /// Returns `None` once the server reports no more records, or when neither side
    /// knows the page size.
    pub fn next_page(&self, page: &ListObject) -> Option<Self> {
        if !page.more {
            return None;
        }
        let limit = if page.limit > 0 { page.limit } else { self.limit.filter(|l| *l > 0)? };
        let current = page.offset.max(self.offset.unwrap_or(0));
        let offset = current.checked_add(limit)?;
        Some(Self { limit: self.limit.or(Some(limit)), offset: Some(offset), total: self.total })
    }
}

impl ToQuery for ListOptions {
    fn append_to(&self, query: &mut Query) {
        query.opt("limit", self.limit).opt("offset", self.offset).flag("total", self.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_object_omits_unset_fields() {
        let obj = ApiObject::reference("PT4KHLK", "user_reference");
        assert_eq!(
            serde_json::to_value(&obj).unwrap(),
            json!({"id": "PT4KHLK", "type": "user_reference"})
        );
    }

    #[test]
    fn api_object_decodes_self_link() {
        let obj: ApiObject = serde_json::from_value(json!({
            "id": "PIJ90N7",
            "type": "service_reference",
            "summary": "My Mail Service",
            "self": "https://api.pagerduty.com/services/PIJ90N7",
            "html_url": "https://subdomain.pagerduty.com/service-directory/PIJ90N7"
        }))
        .unwrap();
        assert_eq!(obj.self_url.as_deref(), Some("https://api.pagerduty.com/services/PIJ90N7"));
        assert_eq!(obj.kind.as_deref(), Some("service_reference"));
    }

    #[test]
    fn next_page_advances_by_limit() {
        let page = ListObject { offset: 0, limit: 25, more: true, total: None };
        let next = ListOptions::default().next_page(&page).unwrap();
        assert_eq!(next, ListOptions { limit: Some(25), offset: Some(25), total: false });

        let last = ListObject { offset: 25, limit: 25, more: false, total: Some(40) };
        assert_eq!(next.next_page(&last), None);
    }

    #[test]
    fn next_page_uses_request_limit_when_response_omits_it() {
        let page: ListObject = serde_json::from_str(r#"{"offset": 0, "more": true}"#).unwrap();
        assert_eq!(page.next_offset(), None);

        let opts = ListOptions { limit: Some(25), offset: Some(0), total: false };
        assert_eq!(opts.next_page(&page), Some(ListOptions { limit: Some(25), offset: Some(25), total: false }));

        let later = ListOptions { limit: Some(25), offset: Some(50), total: false };
        assert_eq!(later.next_page(&page).unwrap().offset, Some(75));
    }

    #[test]
    fn next_page_without_any_limit_stops() {
        let page = ListObject { offset: 0, limit: 0, more: true, total: None };
        assert_eq!(ListOptions::default().next_page(&page), None);
    }

    #[test]
    fn list_options_query() {
        assert!(ListOptions::default().to_query().is_empty());

        let opts = ListOptions { limit: Some(10), offset: Some(20), total: true };
        assert_eq!(opts.to_query().encode(), "limit=10&offset=20&total=true");
    }
}
