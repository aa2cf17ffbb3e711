//! HTTP client for the flag-discriminated master-data API.
//!
//! Every operation is a POST of a `flag`-tagged body to the resource's
//! single endpoint; the HTTP method never varies. Success and failure
//! both come back as JSON envelopes, decoded by the resource adapters.

pub mod error;

pub use error::ApiError;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::resources::{Resource, ViewPayload};

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(&config.http.user_agent)
            .timeout(config.http_timeout())
            .danger_accept_invalid_certs(config.http.accept_invalid_certs)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint<R: Resource>(&self) -> String {
        format!("{}/{}", self.base_url, R::ENDPOINT)
    }

    /// POST one operation to a resource endpoint and decode the reply.
    pub async fn execute<R: Resource>(
        &self,
        body: &R::Request,
    ) -> Result<ViewPayload<R>, ApiError> {
        let url = self.endpoint::<R>();
        debug!(resource = R::KIND.as_str(), %url, "posting request");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(
                resource = R::KIND.as_str(),
                status = status.as_u16(),
                "backend rejected request"
            );
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message: backend_message(&text, status.as_u16()),
            });
        }

        let value: Value = response.json().await?;
        R::parse_response(value)
    }
}

/// Pull a human-readable message out of an error body. The backend
/// answers with either `message` or `MESSAGE`; anything else falls back
/// to a canned line carrying the status code.
fn backend_message(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("MESSAGE")))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("Request failed with status code {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_prefers_the_body_text() {
        assert_eq!(
            backend_message(r#"{"message":"name already exists"}"#, 500),
            "name already exists"
        );
        assert_eq!(
            backend_message(r#"{"MESSAGE":" locked "}"#, 409),
            "locked"
        );
    }

    #[test]
    fn backend_message_falls_back_to_the_status_code() {
        assert_eq!(
            backend_message("<html>Internal Server Error</html>", 500),
            "Request failed with status code 500"
        );
        assert_eq!(
            backend_message(r#"{"message":""}"#, 404),
            "Request failed with status code 404"
        );
        assert_eq!(backend_message("", 502), "Request failed with status code 502");
    }
}
