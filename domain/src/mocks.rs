//! Mocks of the provider traits for unit tests in this crate.

use async_trait::async_trait;
use call_providers::traits::analysis::Dispatcher;
use call_providers::traits::telephony::Provider;
use call_providers::{
    AnalysisRequest, CallStatusReport, ConnectRequest, ConnectResponse, Delivery, Error,
};

mockall::mock! {
    pub TelephonyProvider {}

    #[async_trait]
    impl Provider for TelephonyProvider {
        async fn connect(&self, request: ConnectRequest) -> Result<ConnectResponse, Error>;
        async fn get_call_status(&self, sid: &str) -> Result<CallStatusReport, Error>;
        fn provider_id(&self) -> &str;
    }
}

mockall::mock! {
    pub AnalysisDispatcher {}

    #[async_trait]
    impl Dispatcher for AnalysisDispatcher {
        async fn dispatch(&self, request: AnalysisRequest) -> Result<Delivery, Error>;
        fn provider_id(&self) -> &str;
    }
}
