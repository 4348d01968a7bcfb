use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::wire::{MAX_UPLOAD_BYTES, VIDEO_MIME_PREFIX};

/// What is known about a candidate upload before any bytes are read.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MediaDescriptor {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl MediaDescriptor {
    pub fn size_mb(&self) -> String {
        format!("{:.2} MB", self.size as f64 / (1024.0 * 1024.0))
    }
}

/// Boundary checks applied to every upload, on the client and again on the
/// server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadConstraints {
    pub max_bytes: u64,
    pub mime_prefix: &'static str,
}

impl Default for UploadConstraints {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
            mime_prefix: VIDEO_MIME_PREFIX,
        }
    }
}

impl UploadConstraints {
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    pub fn check(&self, media: &MediaDescriptor) -> Result<(), GatewayError> {
        self.check_size(media.size)?;
        self.check_mime(&media.mime_type)
    }

    pub fn check_size(&self, size: u64) -> Result<(), GatewayError> {
        if size > self.max_bytes {
            return Err(GatewayError::FileTooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    pub fn check_mime(&self, mime_type: &str) -> Result<(), GatewayError> {
        if !mime_type
            .trim()
            .to_ascii_lowercase()
            .starts_with(self.mime_prefix)
        {
            return Err(GatewayError::UnsupportedFileType {
                mime_type: mime_type.to_string(),
            });
        }
        Ok(())
    }
}

/// Bytes of the request body handed to the network so far.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
}

impl UploadProgress {
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.sent.min(self.total) as f64 / self.total as f64 * 100.0) as f32
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.sent >= self.total
    }
}
