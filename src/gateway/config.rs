//! Gateway configuration, read from the environment once at startup.
//!
//! Values are kept raw and only checked when a request needs them, so a
//! server with just the tracker configured can still answer health checks
//! and report exactly which model settings are missing.

use crate::error::GatewayError;

pub const DEFAULT_AI_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_AI_MODEL: &str = "@cf/meta/llama-3.1-8b-instruct";

const TRACKER_VARS: [&str; 5] = [
    "JIRA_DOMAIN",
    "CF_ACCESS_CLIENT_ID",
    "CF_ACCESS_CLIENT_SECRET",
    "JIRA_EMAIL",
    "JIRA_API_TOKEN",
];

const MODEL_VARS: [&str; 2] = ["AI_ACCOUNT_ID", "AI_API_TOKEN"];

/// Everything the gateway may need, each value `None` when unset or blank.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    jira_domain: Option<String>,
    access_client_id: Option<String>,
    access_client_secret: Option<String>,
    jira_email: Option<String>,
    jira_api_token: Option<String>,
    ai_account_id: Option<String>,
    ai_api_token: Option<String>,
    ai_base_url: Option<String>,
    ai_model: Option<String>,
}

/// Settings for the issue tracker, all present.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub domain: String,
    pub access_client_id: String,
    pub access_client_secret: String,
    pub email: String,
    pub api_token: String,
}

impl TrackerConfig {
    /// Base URL for API calls. A bare host gets `https://`.
    pub fn base_url(&self) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        }
    }

    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.base_url())
    }
}

/// Settings for the hosted model, all present.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub base_url: String,
    pub account_id: String,
    pub api_token: String,
    pub model: String,
}

impl ModelConfig {
    pub fn run_url(&self) -> String {
        format!(
            "{}/accounts/{}/ai/run/{}",
            self.base_url.trim_end_matches('/'),
            self.account_id,
            self.model
        )
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any name-to-value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        GatewayConfig {
            jira_domain: get("JIRA_DOMAIN"),
            access_client_id: get("CF_ACCESS_CLIENT_ID"),
            access_client_secret: get("CF_ACCESS_CLIENT_SECRET"),
            jira_email: get("JIRA_EMAIL"),
            jira_api_token: get("JIRA_API_TOKEN"),
            ai_account_id: get("AI_ACCOUNT_ID"),
            ai_api_token: get("AI_API_TOKEN"),
            ai_base_url: get("AI_BASE_URL"),
            ai_model: get("AI_MODEL"),
        }
    }

    fn value(&self, name: &str) -> Option<&String> {
        match name {
            "JIRA_DOMAIN" => self.jira_domain.as_ref(),
            "CF_ACCESS_CLIENT_ID" => self.access_client_id.as_ref(),
            "CF_ACCESS_CLIENT_SECRET" => self.access_client_secret.as_ref(),
            "JIRA_EMAIL" => self.jira_email.as_ref(),
            "JIRA_API_TOKEN" => self.jira_api_token.as_ref(),
            "AI_ACCOUNT_ID" => self.ai_account_id.as_ref(),
            "AI_API_TOKEN" => self.ai_api_token.as_ref(),
            _ => None,
        }
    }

    fn require(&self, names: &[&'static str]) -> Result<(), GatewayError> {
        let configured: Vec<(&'static str, bool)> =
            names.iter().map(|&n| (n, self.value(n).is_some())).collect();
        let missing: Vec<&'static str> = configured
            .iter()
            .filter(|(_, present)| !present)
            .map(|(n, _)| *n)
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        tracing::warn!(?missing, "gateway configuration incomplete");
        Err(GatewayError::MissingConfig { missing, configured })
    }

    pub fn tracker(&self) -> Result<TrackerConfig, GatewayError> {
        self.require(&TRACKER_VARS)?;
        let get = |name: &str| self.value(name).cloned().unwrap_or_default();
        Ok(TrackerConfig {
            domain: get("JIRA_DOMAIN"),
            access_client_id: get("CF_ACCESS_CLIENT_ID"),
            access_client_secret: get("CF_ACCESS_CLIENT_SECRET"),
            email: get("JIRA_EMAIL"),
            api_token: get("JIRA_API_TOKEN"),
        })
    }

    pub fn model(&self) -> Result<ModelConfig, GatewayError> {
        self.require(&MODEL_VARS)?;
        Ok(ModelConfig {
            base_url: self
                .ai_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_string()),
            account_id: self.ai_account_id.clone().unwrap_or_default(),
            api_token: self.ai_api_token.clone().unwrap_or_default(),
            model: self
                .ai_model
                .clone()
                .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
        })
    }
}
