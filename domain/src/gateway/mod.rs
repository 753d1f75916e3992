pub mod analysis_webhook;
pub mod telephony_proxy;
