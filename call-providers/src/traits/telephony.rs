//! Telephony provider trait.

use crate::types::telephony::{CallStatusReport, ConnectRequest, ConnectResponse};
use crate::Error;
use async_trait::async_trait;

/// Abstraction over an outbound calling service.
///
/// A call is started with `connect` and then followed by polling
/// `get_call_status` with the returned sid until the status is terminal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Ask the provider to dial `request.to` from `request.from`.
    async fn connect(&self, request: ConnectRequest) -> Result<ConnectResponse, Error>;

    /// Current status and metadata of a call session.
    async fn get_call_status(&self, sid: &str) -> Result<CallStatusReport, Error>;

    /// Return unique identifier for this provider (e.g., "twilio_proxy").
    fn provider_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::telephony::CallStatus;
    use std::sync::Arc;

    #[tokio::test]
    async fn provider_is_usable_as_a_shared_trait_object() {
        let mut mock = MockProvider::new();
        mock.expect_connect().returning(|request| {
            Ok(ConnectResponse {
                sid: format!("CA-{}", request.to),
                status: CallStatus::Queued,
            })
        });
        mock.expect_get_call_status()
            .returning(|_| Ok(CallStatusReport::new(CallStatus::Ringing)));

        let provider: Arc<dyn Provider> = Arc::new(mock);
        let response = provider
            .connect(ConnectRequest {
                from: "+15550101".to_owned(),
                to: "+15550202".to_owned(),
                caller_id: "+15550100".to_owned(),
            })
            .await
            .unwrap();

        assert_eq!(response.sid, "CA-+15550202");
        let report = provider.get_call_status(&response.sid).await.unwrap();
        assert!(!report.status.is_terminal());
    }
}
