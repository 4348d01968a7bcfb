//! The HTTP contract between the dashboard, the gateway and the detection
//! backend.
//!
//! A single canonical shape is supported: a multipart POST of the `video`
//! field to [`PROCESS_VIDEO_PATH`], answered by either
//! `{"results": [ViolationRecord, ..]}` or `{"error": "..."}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GatewayError;
use crate::record::ViolationRecord;

pub const PROCESS_VIDEO_PATH: &str = "/api/process-video";
pub const REALTIME_FRAME_PATH: &str = "/api/realtime/frame";
pub const HEALTH_PATH: &str = "/api/health";

pub const VIDEO_FIELD: &str = "video";
pub const VIDEO_MIME_PREFIX: &str = "video/";
pub const IMAGE_MIME_PREFIX: &str = "image/";

pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProcessResponse {
    pub results: Vec<ViolationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_secs: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
    pub detector: String,
}

/// One webcam frame sent during real-time detection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RealtimeFrame {
    pub session_id: String,
    pub captured_at: DateTime<Utc>,
    pub mime_type: String,
    /// Base64 (standard alphabet) encoded image bytes.
    pub image: String,
}

/// Interprets a backend answer.
///
/// An `error` string always wins, whatever the status. Success requires a
/// 2xx status and a well-formed `results` array; every other body is a
/// contract violation and never a silent success.
pub fn decode_response(status: u16, body: &str) -> Result<ProcessResponse, GatewayError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        GatewayError::ContractViolation(format!("status {status}, body is not JSON: {e}"))
    })?;

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(GatewayError::BackendError {
            status,
            message: message.to_string(),
        });
    }

    if !(200..300).contains(&status) {
        return Err(GatewayError::ContractViolation(format!(
            "status {status} without an error message"
        )));
    }

    if value.get("results").is_none() {
        return Err(GatewayError::ContractViolation(
            "response has neither `results` nor `error`".into(),
        ));
    }

    let response: ProcessResponse = serde_json::from_value(value)
        .map_err(|e| GatewayError::ContractViolation(format!("malformed `results`: {e}")))?;

    if let Some(record) = response.results.iter().find(|r| !r.has_valid_confidence()) {
        return Err(GatewayError::ContractViolation(format!(
            "record {} has confidence {} outside 0..=1",
            record.id, record.confidence
        )));
    }
    Ok(response)
}
