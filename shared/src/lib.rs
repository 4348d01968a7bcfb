//! Types and client logic shared by the gateway server and the dashboard.
//!
//! Everything here compiles for both native targets and `wasm32`, so the
//! dashboard's behavior (validation, response decoding, retry, state
//! transitions) can be tested without a browser.

pub mod analytics;
pub mod error;
#[cfg(feature = "fixtures")]
pub mod fixtures;
pub mod record;
pub mod state;
pub mod submit;
pub mod validate;
pub mod wire;

pub use analytics::AnalyticsSummary;
pub use error::GatewayError;
pub use record::{Severity, Timestamp, ViolationKind, ViolationRecord};
pub use state::{Action, ActiveView, ProcessingStage, SessionState};
pub use submit::{RetryPolicy, TransportResponse, UploadTransport, VideoSource, submit};
pub use validate::{MediaDescriptor, UploadConstraints, UploadProgress};
pub use wire::{ErrorResponse, HealthResponse, ProcessResponse, RealtimeFrame};
