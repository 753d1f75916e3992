//! Provider abstractions for placing outbound calls and dispatching call recordings
//! for analysis.
//!
//! The telephony provider is reached through a proxy that owns the provider
//! credentials; the analysis service is an external webhook that scores recordings
//! asynchronously. Both are modelled as traits so the domain layer never depends on
//! a concrete HTTP client.

pub mod error;
pub mod traits;
pub mod types;

pub use error::Error;
pub use types::analysis::{AnalysisRequest, Delivery};
pub use types::telephony::{CallStatus, CallStatusReport, ConnectRequest, ConnectResponse};
