use actix_multipart::MultipartError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::{ErrorResponse, GatewayError};

use crate::detector::DetectorError;

/// Every failure a gateway route can answer with. Rendered as
/// `{"error": "<Display>"}` with the matching status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No file part")]
    MissingVideo,
    #[error("No selected file")]
    EmptyVideo,
    #[error(transparent)]
    Rejected(#[from] GatewayError),
    #[error("Malformed upload: {0}")]
    Multipart(String),
    #[error("Frames must be images, got {0:?}")]
    UnsupportedFrame(String),
    #[error("Frame exceeds the {limit} byte limit")]
    FrameTooLarge { limit: u64 },
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
    #[error(transparent)]
    Detector(#[from] DetectorError),
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingVideo
            | ApiError::EmptyVideo
            | ApiError::Multipart(_)
            | ApiError::InvalidFrame(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(GatewayError::FileTooLarge { .. }) | ApiError::FrameTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ApiError::Rejected(GatewayError::UnsupportedFileType { .. })
            | ApiError::UnsupportedFrame(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Detector(DetectorError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Detector(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}
