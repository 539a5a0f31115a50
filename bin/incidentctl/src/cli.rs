use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use config::PagerDutyOpts;
use pagerduty::{
    ApiDetails, ApiReference, CreateIncidentOptions, IncidentStatus, ListIncidentLogEntriesOptions,
    ListIncidentsOptions, ListOptions, Urgency,
};

/// CLI options for incidentctl
#[derive(Debug, Parser)]
#[clap(name = "incidentctl", version, about = "Work with PagerDuty incidents")]
pub(crate) struct Cli {
    /// PagerDuty API configuration
    #[clap(flatten)]
    pub(crate) pagerduty: PagerDutyOpts,

    #[clap(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List incidents
    List(ListArgs),
    /// Show a single incident
    Get {
        /// Incident ID
        id: String,
    },
    /// Create an incident
    Create(CreateArgs),
    /// Acknowledge incidents
    Ack {
        /// Incident IDs
        #[clap(required = true)]
        ids: Vec<String>,
    },
    /// Resolve incidents
    Resolve {
        /// Incident IDs
        #[clap(required = true)]
        ids: Vec<String>,
    },
    /// Escalate an incident to an escalation level
    Escalate {
        /// Incident ID
        id: String,
        /// Target escalation level
        #[clap(long)]
        level: u32,
    },
    /// Reassign an incident to users
    Reassign {
        /// Incident ID
        id: String,
        /// User IDs to assign
        #[clap(long = "user-id", required = true)]
        user_ids: Vec<String>,
    },
    /// List the notes of an incident
    Notes {
        /// Incident ID
        id: String,
    },
    /// Add a note to an incident
    AddNote {
        /// Incident ID
        id: String,
        /// Note text
        #[clap(long)]
        content: String,
    },
    /// Snooze an acknowledged incident
    Snooze {
        /// Incident ID
        id: String,
        /// Snooze duration in seconds
        #[clap(long, default_value = "3600")]
        duration_secs: u64,
    },
    /// List the log entries of an incident
    LogEntries(LogEntriesArgs),
}

/// Pagination flags shared by list commands
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct PageArgs {
    /// Page size
    #[clap(long)]
    limit: Option<u32>,
    /// Offset of the first record
    #[clap(long)]
    offset: Option<u32>,
    /// Ask the server for the total record count
    #[clap(long)]
    total: bool,
}

impl From<&PageArgs> for ListOptions {
    fn from(args: &PageArgs) -> Self {
        Self { limit: args.limit, offset: args.offset, total: args.total }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub(crate) struct ListArgs {
    #[clap(flatten)]
    page: PageArgs,
    /// Start of the date range (RFC 3339)
    #[clap(long)]
    since: Option<DateTime<Utc>>,
    /// End of the date range (RFC 3339)
    #[clap(long)]
    until: Option<DateTime<Utc>>,
    /// Ignore `since`/`until` and search all dates
    #[clap(long, conflicts_with_all = ["since", "until"])]
    all_dates: bool,
    /// Filter by status (repeatable)
    #[clap(long = "status")]
    statuses: Vec<IncidentStatus>,
    /// Filter by de-duplication key
    #[clap(long)]
    incident_key: Option<String>,
    /// Filter by service ID (repeatable)
    #[clap(long = "service-id")]
    service_ids: Vec<String>,
    /// Filter by team ID (repeatable)
    #[clap(long = "team-id")]
    team_ids: Vec<String>,
    /// Filter by assigned user ID (repeatable)
    #[clap(long = "user-id")]
    user_ids: Vec<String>,
    /// Filter by urgency (repeatable)
    #[clap(long = "urgency")]
    urgencies: Vec<Urgency>,
    /// Time zone of returned timestamps
    #[clap(long)]
    time_zone: Option<String>,
    /// Sort order, e.g. `incident_number:desc`
    #[clap(long)]
    sort_by: Option<String>,
    /// Models to side-load (repeatable)
    #[clap(long = "include")]
    includes: Vec<String>,
}

impl ListArgs {
    pub(crate) fn to_options(&self) -> ListIncidentsOptions {
        ListIncidentsOptions {
            list: (&self.page).into(),
            since: self.since,
            until: self.until,
            date_range: self.all_dates.then(|| "all".to_owned()),
            statuses: self.statuses.clone(),
            incident_key: self.incident_key.clone(),
            service_ids: self.service_ids.clone(),
            team_ids: self.team_ids.clone(),
            user_ids: self.user_ids.clone(),
            urgencies: self.urgencies.clone(),
            time_zone: self.time_zone.clone(),
            sort_by: self.sort_by.clone(),
            includes: self.includes.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct CreateArgs {
    /// Incident title
    #[clap(long)]
    title: String,
    /// Service the incident is opened on
    #[clap(long)]
    service_id: String,
    /// Priority ID
    #[clap(long)]
    priority_id: Option<String>,
    /// Escalation policy ID overriding the service's
    #[clap(long)]
    escalation_policy_id: Option<String>,
    /// De-duplication key
    #[clap(long)]
    incident_key: Option<String>,
    /// Incident body details
    #[clap(long)]
    details: Option<String>,
    /// Urgency
    #[clap(long)]
    urgency: Option<Urgency>,
}

impl CreateArgs {
    pub(crate) fn to_options(&self) -> CreateIncidentOptions {
        let mut options =
            CreateIncidentOptions::new(self.title.clone(), ApiReference::service(&self.service_id));
        options.priority = self.priority_id.as_deref().map(ApiReference::priority);
        options.escalation_policy =
            self.escalation_policy_id.as_deref().map(ApiReference::escalation_policy);
        options.incident_key = self.incident_key.clone();
        options.body = self.details.as_deref().map(ApiDetails::incident_body);
        options.urgency = self.urgency;
        options
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct LogEntriesArgs {
    /// Incident ID
    id: String,
    #[clap(flatten)]
    page: PageArgs,
    /// Only the most important changes
    #[clap(long)]
    overview: bool,
    /// Time zone of returned timestamps
    #[clap(long)]
    time_zone: Option<String>,
    /// Models to side-load (repeatable)
    #[clap(long = "include")]
    includes: Vec<String>,
}

impl LogEntriesArgs {
    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn to_options(&self) -> ListIncidentLogEntriesOptions {
        ListIncidentLogEntriesOptions {
            list: (&self.page).into(),
            includes: self.includes.clone(),
            is_overview: self.overview,
            time_zone: self.time_zone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Command {
        let mut argv = vec!["incidentctl", "--api-token", "tok"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn list_args_to_options() {
        let Command::List(args) = parse(&[
            "list",
            "--status",
            "triggered",
            "--status",
            "acknowledged",
            "--urgency",
            "high",
            "--service-id",
            "PIJ90N7",
            "--since",
            "2024-01-01T00:00:00Z",
            "--limit",
            "50",
        ]) else {
            panic!("expected list command");
        };
        let options = args.to_options();

        assert_eq!(options.statuses, [IncidentStatus::Triggered, IncidentStatus::Acknowledged]);
        assert_eq!(options.urgencies, [Urgency::High]);
        assert_eq!(options.service_ids, ["PIJ90N7"]);
        assert_eq!(options.since.unwrap().to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(options.list.limit, Some(50));
        assert_eq!(options.date_range, None);
    }

    #[test]
    fn list_all_dates_sets_date_range() {
        let Command::List(args) = parse(&["list", "--all-dates"]) else {
            panic!("expected list command");
        };
        assert_eq!(args.to_options().date_range.as_deref(), Some("all"));
    }

    #[test]
    fn invalid_status_is_rejected() {
        let res = Cli::try_parse_from(["incidentctl", "--api-token", "t", "list", "--status", "open"]);
        assert!(res.is_err());
    }

    #[test]
    fn create_args_to_options() {
        let Command::Create(args) = parse(&[
            "create",
            "--title",
            "Disk full",
            "--service-id",
            "PWIXJZS",
            "--priority-id",
            "P53ZZH5",
            "--details",
            "/var is at 100%",
        ]) else {
            panic!("expected create command");
        };
        let options = args.to_options();

        assert_eq!(options.kind, "incident");
        assert_eq!(options.service, ApiReference::service("PWIXJZS"));
        assert_eq!(options.priority, Some(ApiReference::priority("P53ZZH5")));
        assert_eq!(options.body, Some(ApiDetails::incident_body("/var is at 100%")));
        assert_eq!(options.escalation_policy, None);
    }

    #[test]
    fn log_entries_args_to_options() {
        let Command::LogEntries(args) =
            parse(&["log-entries", "P1", "--overview", "--include", "channels", "--offset", "5"])
        else {
            panic!("expected log-entries command");
        };
        let options = args.to_options();

        assert_eq!(args.id(), "P1");
        assert!(options.is_overview);
        assert_eq!(options.includes, ["channels"]);
        assert_eq!(options.list.offset, Some(5));
    }
}
