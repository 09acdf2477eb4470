use super::{GenerationBackend, HomepagePayload, check_error_payload, is_identifier, parse_home_pages};
use crate::core::{Result, SiteGenError};
use crate::models::SitePrompt;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

const GENERIC_FAILURE: &str = "We are unable to process the request at this moment";

/// Generation backend reached over HTTP.
///
/// Every call is a JSON `POST` authenticated by a token in the body.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpBackend {
    /// Build a client for `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let mut base_url = base_url.into();
        if base_url.is_empty() {
            return Err(SiteGenError::ConfigError {
                message: "backend.base_url is not set".to_string(),
            });
        }
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            SiteGenError::ConfigError {
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;

        Ok(Self {
            client,
            base_url,
            token: token.unwrap_or_default(),
        })
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<Value> {
        let url = format!("{}{endpoint}", self.base_url);
        debug!(url = %url, "Calling generation backend");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SiteGenError::generation(format!("request to {endpoint} failed: {e}")))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| SiteGenError::generation(format!("failed to read {endpoint} response: {e}")))?;

        if status != 200 {
            warn!(endpoint, status, "Generation backend returned an error status");
            return Err(error_from_response(status, &text));
        }

        let payload: Value = serde_json::from_str(&text).map_err(|e| SiteGenError::InvalidPayload {
            reason: format!("{endpoint} returned invalid JSON: {e}"),
        })?;
        check_error_payload(&payload)?;
        Ok(payload)
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn generate_site_meta(
        &self,
        prompt: &SitePrompt,
        identifier: &str,
        skip_cache: bool,
    ) -> Result<Value> {
        if !is_identifier(identifier) {
            return Err(SiteGenError::generation(format!(
                "The given identifier is not valid: {identifier}"
            )));
        }

        // Caching is the caller's concern; the endpoint always generates
        debug!(identifier, skip_cache, "Requesting site meta");
        self.post(
            "generateSiteMeta",
            json!({
                "hiivetoken": self.token,
                "prompt": prompt.site_description,
                "identifier": identifier,
            }),
        )
        .await
    }

    async fn get_home_pages(
        &self,
        site_description: &str,
        content_style: &str,
        target_audience: &str,
        regenerate: bool,
    ) -> Result<HomepagePayload> {
        let payload = self
            .post(
                "generateHomePages",
                json!({
                    "hiivetoken": self.token,
                    "prompt": {
                        "site_description": site_description,
                        "content_style": content_style,
                        "target_audience": target_audience,
                    },
                    "regenerate": regenerate,
                }),
            )
            .await?;
        parse_home_pages(payload)
    }
}

/// Extract a human message from a non-200 response body.
///
/// A 400 carries `payload.reason`; other statuses may carry `payload` itself.
fn error_from_response(status: u16, body: &str) -> SiteGenError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let payload = parsed.as_ref().and_then(|v| v.get("payload"));

    let reason = match (status, payload) {
        (400, Some(payload)) => payload.get("reason").and_then(Value::as_str).map(str::to_string),
        (_, Some(Value::String(message))) => Some(message.clone()),
        (_, Some(other)) if !other.is_null() => Some(other.to_string()),
        _ => None,
    };

    SiteGenError::generation(reason.unwrap_or_else(|| GENERIC_FAILURE.to_string()))
}
