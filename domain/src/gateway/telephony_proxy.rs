//! HTTP client for the telephony proxy.
//!
//! The proxy holds the telephony provider's credentials and exposes two calls:
//! `POST /calls` to dial and `GET /calls/{sid}` to read a call's status.

use crate::error::Error;
use async_trait::async_trait;
use call_providers::traits::telephony::Provider;
use call_providers::{CallStatusReport, ConnectRequest, ConnectResponse, Error as ProviderError};
use log::*;
use reqwest::StatusCode;

pub struct TelephonyProxyClient {
    client: reqwest::Client,
    base_url: String,
}

impl TelephonyProxyClient {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        response.json::<T>().await.map_err(|e| {
            warn!("Failed to parse telephony proxy response: {:?}", e);
            ProviderError::Deserialization(e.to_string())
        })
    }
}

fn network_error(e: reqwest::Error) -> ProviderError {
    warn!("Telephony proxy unreachable: {:?}", e);
    ProviderError::Network(e.to_string())
}

#[async_trait]
impl Provider for TelephonyProxyClient {
    async fn connect(&self, request: ConnectRequest) -> Result<ConnectResponse, ProviderError> {
        let url = format!("{}/calls", self.base_url);
        debug!("Dialing {} from {}", request.to, request.from);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        if response.status().is_success() {
            Self::read_json(response).await
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Telephony proxy rejected the call: {}", error_text);
            Err(ProviderError::Provider(error_text))
        }
    }

    async fn get_call_status(&self, sid: &str) -> Result<CallStatusReport, ProviderError> {
        let url = format!("{}/calls/{}", self.base_url, sid);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(network_error)?;

        match response.status() {
            status if status.is_success() => Self::read_json(response).await,
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound(format!("call {sid}"))),
            _ => {
                let error_text = response.text().await.unwrap_or_default();
                warn!("Telephony proxy status error for {}: {}", sid, error_text);
                Err(ProviderError::Provider(error_text))
            }
        }
    }

    fn provider_id(&self) -> &str {
        "telephony_proxy"
    }
}
