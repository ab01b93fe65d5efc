//! Ticket creation against the issue tracker's REST API.
//!
//! The tracker sits behind an access layer that answers bad credentials with
//! an HTML login page, often with a 200 status. The content type is checked
//! before anything is parsed so that page never reaches the caller.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::GatewayError;
use crate::gateway::config::TrackerConfig;
use crate::gateway::AppState;

pub const DEFAULT_ISSUE_TYPE: &str = "Task";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub issue_type: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub project: String,
    pub summary: String,
    pub description: Option<String>,
    pub issue_type: String,
}

impl TryFrom<TicketRequest> for NewTicket {
    type Error = GatewayError;

    fn try_from(req: TicketRequest) -> Result<Self, Self::Error> {
        let required = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        match (required(req.project), required(req.summary)) {
            (Some(project), Some(summary)) => Ok(NewTicket {
                project,
                summary,
                description: req.description.filter(|d| !d.trim().is_empty()),
                issue_type: required(req.issue_type).unwrap_or_else(|| DEFAULT_ISSUE_TYPE.to_string()),
            }),
            _ => Err(GatewayError::BadRequest("project and summary are required".into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub key: String,
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "self")]
    pub self_url: String,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub success: bool,
    pub ticket: Ticket,
}

/// Atlassian document with one paragraph per non-empty line.
pub fn description_doc(text: &str) -> Value {
    let paragraphs: Vec<Value> = text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(|l| json!({ "type": "paragraph", "content": [{ "type": "text", "text": l }] }))
        .collect();
    json!({ "type": "doc", "version": 1, "content": paragraphs })
}

fn issue_body(ticket: &NewTicket) -> Value {
    let mut fields = json!({
        "project": { "key": ticket.project },
        "summary": ticket.summary,
        "issuetype": { "name": ticket.issue_type },
    });
    if let Some(description) = &ticket.description {
        fields["description"] = description_doc(description);
    }
    json!({ "fields": fields })
}

/// Create the issue upstream.
pub async fn create_issue(
    http: &reqwest::Client,
    tracker: &TrackerConfig,
    ticket: &NewTicket,
) -> Result<Ticket, GatewayError> {
    let url = format!("{}/rest/api/3/issue", tracker.base_url());
    tracing::debug!(%url, project = %ticket.project, "creating ticket");

    let res = http
        .post(&url)
        .header("CF-Access-Client-Id", &tracker.access_client_id)
        .header("CF-Access-Client-Secret", &tracker.access_client_secret)
        .header("Accept", "application/json")
        .basic_auth(&tracker.email, Some(&tracker.api_token))
        .json(&issue_body(ticket))
        .send()
        .await?;

    let status = res.status();
    let is_html = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/html"));
    if is_html {
        return Err(GatewayError::HtmlResponse { status: status.as_u16() });
    }

    let text = res.text().await?;
    if !status.is_success() {
        let details = serde_json::from_str(&text).unwrap_or(Value::String(text));
        return Err(GatewayError::Upstream { status: status.as_u16(), details });
    }

    let mut created: Ticket =
        serde_json::from_str(&text).map_err(|e| GatewayError::Malformed(e.to_string()))?;
    created.url = tracker.browse_url(&created.key);
    Ok(created)
}

pub async fn create_ticket(
    State(state): State<AppState>,
    payload: Result<Json<TicketRequest>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(req) = payload.map_err(|rejection| GatewayError::BadRequest(rejection.body_text()))?;
    let ticket = NewTicket::try_from(req)?;
    let tracker = state.config.tracker()?;

    let created = create_issue(&state.http, &tracker, &ticket).await.inspect_err(|e| {
        tracing::error!(error = %e, "ticket creation failed");
    })?;
    tracing::info!(key = %created.key, "ticket created");

    Ok((
        StatusCode::CREATED,
        Json(TicketResponse { success: true, ticket: created }),
    )
        .into_response())
}
