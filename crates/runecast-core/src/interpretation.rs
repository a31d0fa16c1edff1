//! HTTP client for the remote interpretation function.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{RuneError, RuneResult};
use crate::gateway::{InterpretationGateway, InterpretationRequest};
use crate::session::Session;

/// Reply of the interpretation function: either text or an error payload
#[derive(Debug, Deserialize)]
struct InterpretationResponse {
    interpretation: Option<String>,
    error: Option<String>,
}

/// Calls a single JSON endpoint that turns a spread into prose
pub struct HttpInterpreter {
    client: Client,
    endpoint: String,
}

impl HttpInterpreter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> RuneResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InterpretationGateway for HttpInterpreter {
    async fn interpret(
        &self,
        session: &Session,
        request: &InterpretationRequest,
    ) -> RuneResult<String> {
        info!(spread = %request.spread_type, runes = request.runes.len(), "requesting interpretation");

        let mut http = self.client.post(&self.endpoint).json(request);
        if let Some(token) = &session.access_token {
            http = http.bearer_auth(token);
        }

        let response = http
            .send()
            .await
            .map_err(|e| RuneError::Gateway(format!("Failed to reach interpretation service: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RuneError::Gateway(format!("Failed to read interpretation: {e}")))?;

        parse_reply(status, &body)
            .inspect(|text| debug!(chars = text.len(), "interpretation received"))
    }
}

/// Interpret a reply body. A JSON `error` field wins; a non-JSON body on a
/// failed status falls back to the status itself.
fn parse_reply(status: StatusCode, body: &str) -> RuneResult<String> {
    let reply: InterpretationResponse = match serde_json::from_str(body) {
        Ok(reply) => reply,
        Err(_) if !status.is_success() => return Err(status_error(status)),
        Err(e) => {
            return Err(RuneError::Gateway(format!(
                "Failed to parse interpretation: {e}"
            )))
        }
    };
    if let Some(error) = reply.error {
        return Err(RuneError::Gateway(error));
    }
    if !status.is_success() {
        return Err(status_error(status));
    }
    match reply.interpretation {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(RuneError::Gateway(
            "Interpretation service returned no text".to_string(),
        )),
    }
}

fn status_error(status: StatusCode) -> RuneError {
    RuneError::Gateway(format!("Interpretation failed with status: {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_reply() {
        let text = parse_reply(StatusCode::OK, r#"{"interpretation":"Seek patience."}"#).unwrap();
        assert_eq!(text, "Seek patience.");
    }

    #[test]
    fn test_error_payload_wins() {
        let err = parse_reply(StatusCode::OK, r#"{"error":"quota exceeded"}"#).unwrap_err();
        assert!(matches!(err, RuneError::Gateway(msg) if msg == "quota exceeded"));
    }

    #[test]
    fn test_non_success_status() {
        let err = parse_reply(StatusCode::BAD_GATEWAY, "{}").unwrap_err();
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_html_error_page_reports_status() {
        let body = "<html><body><h1>502 Bad Gateway</h1></body></html>";
        let err = parse_reply(StatusCode::BAD_GATEWAY, body).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Interpretation failed with status: 502"), "{msg}");
        assert!(!msg.contains("parse"));
    }

    #[test]
    fn test_garbled_success_body_is_a_parse_error() {
        let err = parse_reply(StatusCode::OK, "not json").unwrap_err();
        assert!(err.to_string().contains("Failed to parse interpretation"));
    }

    #[test]
    fn test_empty_text_is_an_error() {
        assert!(parse_reply(StatusCode::OK, r#"{"interpretation":"  "}"#).is_err());
    }
}
