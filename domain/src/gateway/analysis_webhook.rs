//! HTTP client for the call analysis webhook.
//!
//! Requests go out as JSON. If that fails the same fields are sent once more as a
//! form-encoded body, which some webhook runners accept when they reject JSON. The
//! fallback's response is not inspected.

use crate::error::Error;
use async_trait::async_trait;
use call_providers::traits::analysis::Dispatcher;
use call_providers::{AnalysisRequest, Delivery, Error as ProviderError};
use log::*;

pub struct AnalysisWebhookClient {
    client: reqwest::Client,
    url: String,
}

impl AnalysisWebhookClient {
    pub fn new(url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }

    async fn send_json(&self, request: &AnalysisRequest) -> Result<(), String> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            Err(format!("{status}: {error_text}"))
        }
    }
}

#[async_trait]
impl Dispatcher for AnalysisWebhookClient {
    async fn dispatch(&self, request: AnalysisRequest) -> Result<Delivery, ProviderError> {
        debug!(
            "Dispatching analysis {} for call {}",
            request.analysis_id, request.call_id
        );

        match self.send_json(&request).await {
            Ok(()) => return Ok(Delivery::Primary),
            Err(reason) => warn!(
                "Analysis webhook rejected JSON request for {}: {}; retrying as form",
                request.analysis_id, reason
            ),
        }

        self.client
            .post(&self.url)
            .form(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Analysis webhook unreachable: {:?}", e);
                ProviderError::Network(e.to_string())
            })?;

        Ok(Delivery::Fallback)
    }

    fn provider_id(&self) -> &str {
        "analysis_webhook"
    }
}
