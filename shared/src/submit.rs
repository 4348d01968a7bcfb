use std::time::Duration;

use crate::error::GatewayError;
use crate::validate::{MediaDescriptor, UploadConstraints};
use crate::wire::{ProcessResponse, decode_response};

/// Something that can be uploaded as the `video` field.
pub trait VideoSource {
    fn descriptor(&self) -> MediaDescriptor;
}

/// Raw answer from the transport, before contract decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one multipart upload and returns whatever the server answered.
///
/// Implementations report progress on their own; failures to reach the
/// server at all must be returned as [`GatewayError::NetworkFailure`].
#[allow(async_fn_in_trait)]
pub trait UploadTransport {
    type Source: VideoSource;

    async fn send(&self, source: &Self::Source) -> Result<TransportResponse, GatewayError>;

    async fn pause(&self, delay: Duration);

    /// Called before a retried attempt is sent, with that attempt's number.
    fn retrying(&self, _attempt: u32) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}

impl RetryPolicy {
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            multiplier: 1,
        }
    }

    pub fn network(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            multiplier: 2,
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .max(1)
            .saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor)
    }

    pub fn should_retry(&self, attempt: u32, err: &GatewayError) -> bool {
        err.is_retryable() && attempt < self.max_attempts
    }
}

/// Validates `source`, uploads it and decodes the backend's answer.
///
/// Nothing is sent when validation fails. Only network failures are retried.
pub async fn submit<T: UploadTransport>(
    transport: &T,
    source: &T::Source,
    constraints: &UploadConstraints,
    retry: &RetryPolicy,
) -> Result<ProcessResponse, GatewayError> {
    let media = source.descriptor();
    constraints.check(&media)?;

    let mut attempt = 1;
    loop {
        log::debug!("Uploading {} ({} bytes), attempt {}", media.name, media.size, attempt);
        let outcome = match transport.send(source).await {
            Ok(response) => decode_response(response.status, &response.body),
            Err(e) => Err(e),
        };

        match outcome {
            Err(e) if retry.should_retry(attempt, &e) => {
                let delay = retry.backoff(attempt);
                log::warn!("Upload of {} failed ({}), retrying in {:?}", media.name, e, delay);
                transport.pause(delay).await;
                attempt += 1;
                transport.retrying(attempt);
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    struct Clip(MediaDescriptor);

    impl VideoSource for Clip {
        fn descriptor(&self) -> MediaDescriptor {
            self.0.clone()
        }
    }

    fn clip(size: u64, mime_type: &str) -> Clip {
        Clip(MediaDescriptor {
            name: "clip.mp4".into(),
            size,
            mime_type: mime_type.into(),
        })
    }

    #[derive(Default)]
    struct ScriptedTransport {
        answers: RefCell<VecDeque<Result<TransportResponse, GatewayError>>>,
        sends: Cell<u32>,
        pauses: RefCell<Vec<Duration>>,
        retried: RefCell<Vec<u32>>,
    }

    impl ScriptedTransport {
        fn with(answers: Vec<Result<TransportResponse, GatewayError>>) -> Self {
            Self {
                answers: RefCell::new(answers.into()),
                ..Self::default()
            }
        }
    }

    impl UploadTransport for ScriptedTransport {
        type Source = Clip;

        async fn send(&self, _source: &Clip) -> Result<TransportResponse, GatewayError> {
            self.sends.set(self.sends.get() + 1);
            self.answers
                .borrow_mut()
                .pop_front()
                .expect("transport called more often than scripted")
        }

        async fn pause(&self, delay: Duration) {
            self.pauses.borrow_mut().push(delay);
        }

        fn retrying(&self, attempt: u32) {
            self.retried.borrow_mut().push(attempt);
        }
    }

    fn ok(body: serde_json::Value) -> Result<TransportResponse, GatewayError> {
        Ok(TransportResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    fn offline() -> Result<TransportResponse, GatewayError> {
        Err(GatewayError::NetworkFailure("connection refused".into()))
    }

    fn record(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "timestamp": "2024-03-01T10:15:00Z",
            "location": "",
            "plate_number": "AB0658",
            "vehicle_type": "Motorcycle",
            "violations": ["No helmet"],
            "confidence": 0.5,
            "screenshot": ""
        })
    }

    #[test]
    fn oversized_file_is_rejected_without_sending() {
        let transport = ScriptedTransport::default();
        let source = clip(crate::wire::MAX_UPLOAD_BYTES + 1, "video/mp4");

        let result = block_on(submit(
            &transport,
            &source,
            &UploadConstraints::default(),
            &RetryPolicy::default(),
        ));

        assert!(matches!(result, Err(GatewayError::FileTooLarge { .. })));
        assert_eq!(transport.sends.get(), 0);
    }

    #[test]
    fn non_video_is_rejected_without_sending() {
        let transport = ScriptedTransport::default();

        let result = block_on(submit(
            &transport,
            &clip(1024, "image/jpeg"),
            &UploadConstraints::default(),
            &RetryPolicy::network(3, Duration::from_millis(10)),
        ));

        assert!(matches!(result, Err(GatewayError::UnsupportedFileType { .. })));
        assert_eq!(transport.sends.get(), 0);
    }

    #[test]
    fn successful_upload_returns_every_record() {
        let transport = ScriptedTransport::with(vec![ok(json!({
            "results": [record("VIO-1"), record("VIO-2")]
        }))]);

        let response = block_on(submit(
            &transport,
            &clip(1024, "video/mp4"),
            &UploadConstraints::default(),
            &RetryPolicy::default(),
        ))
        .unwrap();

        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].id, "VIO-1");
        assert_eq!(response.results[1].id, "VIO-2");
        assert_eq!(transport.sends.get(), 1);
    }

    #[test]
    fn default_policy_makes_a_single_attempt() {
        let transport = ScriptedTransport::with(vec![offline()]);

        let result = block_on(submit(
            &transport,
            &clip(1024, "video/mp4"),
            &UploadConstraints::default(),
            &RetryPolicy::default(),
        ));

        assert!(matches!(result, Err(GatewayError::NetworkFailure(_))));
        assert_eq!(transport.sends.get(), 1);
        assert!(transport.pauses.borrow().is_empty());
        assert!(transport.retried.borrow().is_empty());
    }

    #[test]
    fn network_failures_are_retried_with_backoff() {
        let transport =
            ScriptedTransport::with(vec![offline(), offline(), ok(json!({ "results": [] }))]);

        let response = block_on(submit(
            &transport,
            &clip(1024, "video/mp4"),
            &UploadConstraints::default(),
            &RetryPolicy::network(3, Duration::from_millis(100)),
        ))
        .unwrap();

        assert!(response.results.is_empty());
        assert_eq!(transport.sends.get(), 3);
        assert_eq!(
            *transport.pauses.borrow(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
        assert_eq!(*transport.retried.borrow(), vec![2, 3]);
    }

    #[test]
    fn retries_stop_at_max_attempts() {
        let transport = ScriptedTransport::with(vec![offline(), offline()]);

        let result = block_on(submit(
            &transport,
            &clip(1024, "video/mp4"),
            &UploadConstraints::default(),
            &RetryPolicy::network(2, Duration::from_millis(1)),
        ));

        assert!(matches!(result, Err(GatewayError::NetworkFailure(_))));
        assert_eq!(transport.sends.get(), 2);
    }

    #[test]
    fn backend_errors_are_not_retried() {
        let transport = ScriptedTransport::with(vec![Ok(TransportResponse {
            status: 500,
            body: json!({ "error": "File processing error" }).to_string(),
        })]);

        let err = block_on(submit(
            &transport,
            &clip(1024, "video/mp4"),
            &UploadConstraints::default(),
            &RetryPolicy::network(5, Duration::from_millis(1)),
        ))
        .unwrap_err();

        assert_eq!(err.to_string(), "File processing error");
        assert_eq!(transport.sends.get(), 1);
    }

    #[test]
    fn malformed_success_is_not_retried_or_accepted() {
        let transport = ScriptedTransport::with(vec![ok(json!({ "status": "done" }))]);

        let err = block_on(submit(
            &transport,
            &clip(1024, "video/mp4"),
            &UploadConstraints::default(),
            &RetryPolicy::network(5, Duration::from_millis(1)),
        ))
        .unwrap_err();

        assert!(matches!(err, GatewayError::ContractViolation(_)));
        assert_eq!(transport.sends.get(), 1);
    }

    #[test]
    fn backoff_grows_geometrically() {
        let policy = RetryPolicy::network(4, Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff(3), Duration::from_millis(2000));
        assert_eq!(RetryPolicy::network(0, Duration::ZERO).max_attempts, 1);
    }
}
