//! Communication template drafting through a hosted model.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::gateway::config::ModelConfig;
use crate::gateway::AppState;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates professional communication templates for DesignOps professionals.";
const EMPTY_REPLY: &str = "Unable to generate template. Please try again.";
const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRequest {
    #[serde(default)]
    pub task_text: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub success: bool,
    pub template: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    #[serde(default)]
    result: Option<RunResult>,
}

#[derive(Debug, Deserialize)]
struct RunResult {
    #[serde(default)]
    response: Option<String>,
}

/// User prompt for one communication task.
pub fn build_prompt(task_text: &str, context: Option<&str>) -> String {
    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| format!("Additional context: {c}"))
        .unwrap_or_default();

    format!(
        "You are a helpful assistant for a DesignOps professional. Generate a professional communication template for the following task: \"{task_text}\"

{context}

Create a clear, concise email template with rich formatting using markdown:
1. A subject line (marked with \"**Subject:**\")
2. A brief greeting
3. The main message with **[BLANK]** placeholders for the user to fill in specific details
4. Use markdown formatting: **bold** for emphasis, bullet points for lists, etc.
5. A professional closing

Keep it professional but friendly. Make it easy to customize by using **[BLANK]** placeholders where specific information needs to be added. Use markdown formatting to make the template visually appealing.

Template:"
    )
}

/// Run the prompt against the model and return its reply text.
pub async fn generate(
    http: &reqwest::Client,
    model: &ModelConfig,
    prompt: &str,
) -> Result<String, GatewayError> {
    let body = RunRequest {
        messages: vec![
            ChatMessage { role: "system", content: SYSTEM_PROMPT },
            ChatMessage { role: "user", content: prompt },
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    };

    let res = http
        .post(model.run_url())
        .bearer_auth(&model.api_token)
        .json(&body)
        .send()
        .await?;

    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        let details = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
        return Err(GatewayError::Upstream { status: status.as_u16(), details });
    }

    let parsed: RunResponse =
        serde_json::from_str(&text).map_err(|e| GatewayError::Malformed(e.to_string()))?;
    Ok(parsed
        .result
        .and_then(|r| r.response)
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| EMPTY_REPLY.to_string()))
}

fn failure(details: String) -> Response {
    let body = serde_json::json!({
        "success": false,
        "error": "Failed to generate template",
        "details": details,
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

pub async fn generate_comm_template(
    State(state): State<AppState>,
    payload: Result<Json<TemplateRequest>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "unreadable template request");
            return Ok(failure(rejection.body_text()));
        }
    };
    let task_text = req
        .task_text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GatewayError::BadRequest("Task text is required".into()))?;

    let model = state.config.model()?;
    let prompt = build_prompt(task_text, req.context.as_deref());

    match generate(&state.http, &model, &prompt).await {
        Ok(template) => {
            tracing::info!(chars = template.len(), "template generated");
            Ok(Json(TemplateResponse { success: true, template }).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "template generation failed");
            Ok(failure(e.to_string()))
        }
    }
}
