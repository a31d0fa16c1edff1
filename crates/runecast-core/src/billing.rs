//! HTTP client for the billing processor's checkout and portal functions.
//!
//! The client never decides entitlement itself; it only hands the user off
//! and asks the server to verify a finished checkout. The subscription
//! record is written server-side.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RuneError, RuneResult};
use crate::gateway::BillingGateway;
use crate::session::Session;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequest<'a> {
    price_id: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    session_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct UrlResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
}

/// Billing functions hosted under one base URL
pub struct HttpBilling {
    client: Client,
    base_url: String,
}

impl HttpBilling {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RuneResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn call<B, T>(&self, session: &Session, function: &str, body: &B) -> RuneResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, function);
        let token = session
            .access_token
            .as_deref()
            .ok_or(RuneError::AuthenticationRequired)?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| RuneError::Gateway(format!("Failed to reach billing ({function}): {e}")))?;

        if !response.status().is_success() {
            return Err(RuneError::Gateway(format!(
                "Billing {} failed with status: {}",
                function,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RuneError::Gateway(format!("Failed to parse billing response: {e}")))
    }
}

#[async_trait]
impl BillingGateway for HttpBilling {
    async fn create_checkout(&self, session: &Session, price_id: &str) -> RuneResult<String> {
        info!(price_id, "creating checkout session");
        let reply: UrlResponse = self
            .call(session, "create-checkout", &CheckoutRequest { price_id })
            .await?;
        Ok(reply.url)
    }

    async fn customer_portal(&self, session: &Session) -> RuneResult<String> {
        let reply: UrlResponse = self
            .call(session, "customer-portal", &serde_json::json!({}))
            .await?;
        Ok(reply.url)
    }

    async fn verify_checkout(
        &self,
        session: &Session,
        checkout_session_id: &str,
    ) -> RuneResult<bool> {
        let reply: VerifyResponse = self
            .call(
                session,
                "verify-checkout",
                &VerifyRequest {
                    session_id: checkout_session_id,
                },
            )
            .await?;
        Ok(reply.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;

    #[test]
    fn test_checkout_body_uses_camel_case() {
        let json = serde_json::to_string(&CheckoutRequest { price_id: "price_1" }).unwrap();
        assert_eq!(json, r#"{"priceId":"price_1"}"#);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let billing = HttpBilling::new("https://fn.example/", Duration::from_secs(5)).unwrap();
        assert_eq!(billing.base_url, "https://fn.example");
    }

    #[tokio::test]
    async fn test_call_without_token_requires_auth() {
        let billing = HttpBilling::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let session = Session::new(UserId::new("u1"));
        let result = billing.customer_portal(&session).await;
        assert!(matches!(result, Err(RuneError::AuthenticationRequired)));
    }
}
