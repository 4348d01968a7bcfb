use futures::future::BoxFuture;
use reqwest::multipart::{Form, Part};
use shared::wire::{ProcessResponse, decode_response};
use shared::{GatewayError, RetryPolicy};
use std::time::Duration;
use url::Url;

use super::{DetectionResult, DetectorError, ViolationDetector};
use crate::config::{ConfigError, DetectorConfig};
use crate::upload::{FrameUpload, VideoUpload};

/// Forwards uploads to an HTTP detection backend speaking the same
/// `results` / `error` contract as the gateway itself.
pub struct RemoteDetector {
    client: reqwest::Client,
    video_url: Url,
    video_field: String,
    frame_url: Url,
    frame_field: String,
    retry: RetryPolicy,
}

struct Outgoing<'a> {
    url: &'a Url,
    field: &'a str,
    file_name: String,
    mime_type: &'a str,
    data: &'a [u8],
}

impl RemoteDetector {
    pub fn new(config: &DetectorConfig) -> Result<Self, ConfigError> {
        let base = config.base_url()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            video_url: base.join(&config.video_path)?,
            video_field: config.video_field.clone(),
            frame_url: base.join(&config.frame_path)?,
            frame_field: config.frame_field.clone(),
            retry: RetryPolicy::network(
                config.retry_attempts,
                Duration::from_millis(config.retry_backoff_ms),
            ),
        })
    }

    pub fn video_url(&self) -> &Url {
        &self.video_url
    }

    pub fn frame_url(&self) -> &Url {
        &self.frame_url
    }

    async fn forward(&self, outgoing: Outgoing<'_>) -> DetectionResult {
        let mut attempt = 1;
        loop {
            match self.post_once(&outgoing).await {
                Err(e) if self.retry.should_retry(attempt, &e) => {
                    let delay = self.retry.backoff(attempt);
                    log::warn!(
                        "Detector at {} unreachable ({}), retrying in {:?}",
                        outgoing.url,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    log::error!("Detector at {} failed: {:?}", outgoing.url, e);
                    return Err(DetectorError::from(e));
                }
                Ok(response) => return Ok(response.results),
            }
        }
    }

    async fn post_once(&self, outgoing: &Outgoing<'_>) -> Result<ProcessResponse, GatewayError> {
        let part = Part::bytes(outgoing.data.to_vec())
            .file_name(outgoing.file_name.clone())
            .mime_str(outgoing.mime_type)
            .map_err(|_| GatewayError::UnsupportedFileType {
                mime_type: outgoing.mime_type.to_string(),
            })?;
        let form = Form::new().part(outgoing.field.to_string(), part);

        let response = self
            .client
            .post(outgoing.url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::NetworkFailure(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::NetworkFailure(e.to_string()))?;

        decode_response(status, &body)
    }
}

impl ViolationDetector for RemoteDetector {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn detect_video<'a>(&'a self, video: &'a VideoUpload) -> BoxFuture<'a, DetectionResult> {
        Box::pin(self.forward(Outgoing {
            url: &self.video_url,
            field: &self.video_field,
            file_name: video.file_name.clone(),
            mime_type: &video.mime_type,
            data: &video.data,
        }))
    }

    fn detect_frame<'a>(&'a self, frame: &'a FrameUpload) -> BoxFuture<'a, DetectionResult> {
        Box::pin(self.forward(Outgoing {
            url: &self.frame_url,
            field: &self.frame_field,
            file_name: frame.file_name(),
            mime_type: &frame.mime_type,
            data: &frame.data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths_resolve_against_the_base_url() {
        let config = DetectorConfig {
            base_url: "http://detector:5000/v1/".into(),
            video_path: "process_video".into(),
            frame_path: "/frame".into(),
            ..DetectorConfig::default()
        };
        let detector = RemoteDetector::new(&config).unwrap();
        assert_eq!(
            detector.video_url().as_str(),
            "http://detector:5000/v1/process_video"
        );
        assert_eq!(detector.frame_url().as_str(), "http://detector:5000/frame");
    }

    #[test]
    fn default_upstream_speaks_the_gateway_contract() {
        let detector = RemoteDetector::new(&DetectorConfig::default()).unwrap();
        assert_eq!(
            detector.video_url().as_str(),
            "http://localhost:5000/api/process-video"
        );
        assert_eq!(detector.video_field, "video");
    }

    #[actix_web::test]
    async fn unreachable_backend_is_reported_as_unavailable() {
        let config = DetectorConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
            ..DetectorConfig::default()
        };
        let detector = RemoteDetector::new(&config).unwrap();
        let frame = FrameUpload {
            session_id: "s-1".into(),
            captured_at: chrono::Utc::now(),
            mime_type: "image/jpeg".into(),
            data: vec![0xFF, 0xD8, 0xFF],
        };

        let err = detector.detect_frame(&frame).await.unwrap_err();

        assert!(matches!(err, DetectorError::Unavailable(_)));
        assert_eq!(err.to_string(), "Detection backend unavailable");
    }
}
