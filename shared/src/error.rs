use thiserror::Error;

const MIB: u64 = 1024 * 1024;

/// Everything that can go wrong between picking a video and showing results.
///
/// The `Display` output is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error(
        "File size exceeds the {} limit. Please upload a smaller file or compress your video.",
        display_limit(.limit)
    )]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Please upload a video file")]
    UnsupportedFileType { mime_type: String },

    #[error("Network error: {0}")]
    NetworkFailure(String),

    /// The backend answered with an `error` message; shown verbatim.
    #[error("{message}")]
    BackendError { status: u16, message: String },

    #[error("Unexpected response from the server: {0}")]
    ContractViolation(String),

    #[error("Failed to access webcam. Please ensure you have granted camera permissions. ({0})")]
    CameraAccessDenied(String),
}

fn display_limit(bytes: &u64) -> String {
    match *bytes {
        b if b >= MIB && b % MIB == 0 => format!("{}MB", b / MIB),
        b if b >= MIB => format!("{:.1}MB", b as f64 / MIB as f64),
        b => format!("{} byte", b),
    }
}

impl GatewayError {
    /// Only transport failures are worth another attempt. Validation and
    /// backend verdicts would fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkFailure(_))
    }
}
