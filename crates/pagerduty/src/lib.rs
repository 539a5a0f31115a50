//! Typed client for the PagerDuty v2 incidents API.
//!
//! Each operation maps to exactly one HTTP request: options are encoded into a
//! query string or a JSON envelope, and responses are decoded back into typed
//! structures. Retries, rate limiting and timeouts belong to the underlying
//! [`Transport`].
//!
//! ```no_run
//! use pagerduty::{Client, IncidentStatus, ListIncidentsOptions};
//!
//! # async fn run() -> pagerduty::Result<()> {
//! let client = Client::new("api-token");
//! let options =
//!     ListIncidentsOptions { statuses: vec![IncidentStatus::Triggered], ..Default::default() };
//! for incident in client.list_incidents(&options).await?.incidents {
//!     println!("{:?} {:?}", incident.id(), incident.title);
//! }
//! # Ok(())
//! # }
//! ```

/// API client and response decoding
pub mod client;
/// Error types
pub mod error;
/// Incident resources and operations
pub mod incident;
/// Incident log entries
pub mod log_entry;
/// Query-string encoding
pub mod query;
/// HTTP transport
pub mod transport;
/// Shared API shapes
pub mod types;

pub use client::Client;
pub use error::{Error, ParseValueError, Result};
pub use incident::{
    Acknowledgement, Assignment, CreateIncidentOptions, Incident, IncidentNote, IncidentStatus,
    ListIncidentLogEntriesOptions, ListIncidentLogEntriesResponse, ListIncidentsOptions,
    ListIncidentsResponse, PendingAction, Urgency,
};
pub use log_entry::{Channel, Context, LogEntry};
pub use query::{Query, ToQuery};
pub use transport::{ApiResponse, DEFAULT_BASE_URL, HttpClient, Transport};
pub use types::{ApiDetails, ApiObject, ApiReference, ListObject, ListOptions};
