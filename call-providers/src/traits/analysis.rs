//! Analysis dispatch trait.

use crate::types::analysis::{AnalysisRequest, Delivery};
use crate::Error;
use async_trait::async_trait;

/// Hands a recording to the external analysis service.
///
/// Dispatch is fire-and-forget: results come back later by the analysis row being
/// updated out of band, so implementations only report how the request was sent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, request: AnalysisRequest) -> Result<Delivery, Error>;

    /// Return unique identifier for this dispatcher (e.g., "webhook").
    fn provider_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatch_errors_propagate_to_the_caller() {
        let mut mock = MockDispatcher::new();
        mock.expect_dispatch()
            .returning(|_| Err(Error::Network("connection refused".to_owned())));

        let request = AnalysisRequest {
            url: "https://recordings.example.com/RE1.mp3".to_owned(),
            name: "RE1.mp3".to_owned(),
            recording_id: "rec-1".to_owned(),
            analysis_id: "an-1".to_owned(),
            user_id: "emp-1".to_owned(),
            call_id: "call-1".to_owned(),
            timestamp: chrono::Utc::now(),
            source: "crm".to_owned(),
        };

        let err = mock.dispatch(request).await.unwrap_err();
        assert!(err.is_transient());
    }
}
