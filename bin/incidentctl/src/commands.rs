use eyre::{Result, eyre};
use pagerduty::{Client, Incident, IncidentNote, Transport};
use serde_json::{Value, to_value};
use tracing::info;

use crate::cli::Command;

fn require_from(from: Option<&str>) -> Result<&str> {
    from.ok_or_else(|| eyre!("this command needs --from or PAGERDUTY_FROM"))
}

/// Run `command`, returning the JSON document to print, if any.
pub(crate) async fn execute<T: Transport>(
    client: &Client<T>,
    from: Option<&str>,
    command: Command,
) -> Result<Option<Value>> {
    let output = match command {
        Command::List(args) => to_value(client.list_incidents(&args.to_options()).await?)?,
        Command::Get { id } => to_value(client.get_incident(&id).await?)?,
        Command::Create(args) => {
            let incident = client.create_incident(require_from(from)?, &args.to_options()).await?;
            to_value(incident)?
        }
        Command::Ack { ids } => {
            let incidents: Vec<_> = ids.into_iter().map(Incident::acknowledge).collect();
            client.manage_incidents(require_from(from)?, &incidents).await?;
            info!(count = incidents.len(), "Acknowledged incidents");
            return Ok(None);
        }
        Command::Resolve { ids } => {
            let incidents: Vec<_> = ids.into_iter().map(Incident::resolve).collect();
            client.manage_incidents(require_from(from)?, &incidents).await?;
            info!(count = incidents.len(), "Resolved incidents");
            return Ok(None);
        }
        Command::Escalate { id, level } => {
            client.manage_incidents(require_from(from)?, &[Incident::escalate(&id, level)]).await?;
            info!(incident_id = %id, level, "Escalated incident");
            return Ok(None);
        }
        Command::Reassign { id, user_ids } => {
            let incident = Incident::reassign(&id, user_ids);
            client.manage_incidents(require_from(from)?, &[incident]).await?;
            info!(incident_id = %id, "Reassigned incident");
            return Ok(None);
        }
        Command::Notes { id } => to_value(client.list_incident_notes(&id).await?)?,
        Command::AddNote { id, content } => {
            client.create_incident_note(&id, require_from(from)?, &IncidentNote::new(content)).await?;
            info!(incident_id = %id, "Added note");
            return Ok(None);
        }
        Command::Snooze { id, duration_secs } => {
            client.snooze_incident(&id, duration_secs).await?;
            info!(incident_id = %id, duration_secs, "Snoozed incident");
            return Ok(None);
        }
        Command::LogEntries(args) => {
            to_value(client.list_incident_log_entries(args.id(), &args.to_options()).await?)?
        }
    };
    Ok(Some(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    async fn mock_client() -> (Client, ServerGuard) {
        let server = Server::new_async().await;
        let client = Client::with_base_url("test_token", server.url().parse().unwrap());
        (client, server)
    }

    fn command(args: &[&str]) -> Command {
        let mut argv = vec!["incidentctl", "--api-token", "tok"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[tokio::test]
    async fn ack_manages_all_ids() {
        let (client, mut server) = mock_client().await;
        let mock = server
            .mock("PUT", "/incidents")
            .match_header("from", "oncall@example.com")
            .match_body(Matcher::Json(json!({"incidents": [
                {"id": "P1", "type": "incident_reference", "status": "acknowledged"},
                {"id": "P2", "type": "incident_reference", "status": "acknowledged"}
            ]})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let out = execute(&client, Some("oncall@example.com"), command(&["ack", "P1", "P2"]))
            .await
            .unwrap();

        assert_eq!(out, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_prints_incident() {
        let (client, mut server) = mock_client().await;
        let _mock = server
            .mock("GET", "/incidents/P1")
            .with_status(200)
            .with_body(r#"{"incident": {"id": "P1", "status": "resolved"}}"#)
            .create_async()
            .await;

        let out = execute(&client, None, command(&["get", "P1"])).await.unwrap();

        assert_eq!(out, Some(json!({"id": "P1", "status": "resolved"})));
    }

    #[tokio::test]
    async fn writes_require_from() {
        let (client, _server) = mock_client().await;

        let err = execute(&client, None, command(&["add-note", "P1", "--content", "hi"]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("--from"));
    }

    #[tokio::test]
    async fn snooze_does_not_need_from() {
        let (client, mut server) = mock_client().await;
        let mock = server
            .mock("POST", "/incidents/P1/snooze")
            .match_body(Matcher::Json(json!({"duration": 600})))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        execute(&client, None, command(&["snooze", "P1", "--duration-secs", "600"])).await.unwrap();

        mock.assert_async().await;
    }
}
