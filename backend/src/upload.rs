use actix_multipart::Multipart;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use sha2::{Digest, Sha256};
use shared::wire::{IMAGE_MIME_PREFIX, VIDEO_FIELD};
use shared::{MediaDescriptor, RealtimeFrame, UploadConstraints};

use crate::error::ApiError;

pub struct VideoUpload {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl VideoUpload {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn descriptor(&self) -> MediaDescriptor {
        MediaDescriptor {
            name: self.file_name.clone(),
            size: self.size(),
            mime_type: self.mime_type.clone(),
        }
    }

    pub fn digest(&self) -> String {
        sha256_hex(&self.data)
    }
}

#[derive(Debug)]
pub struct FrameUpload {
    pub session_id: String,
    pub captured_at: DateTime<Utc>,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl FrameUpload {
    /// Decodes a posted frame, enforcing the image type and `max_bytes`.
    pub fn decode(frame: RealtimeFrame, max_bytes: u64) -> Result<Self, ApiError> {
        if !frame.mime_type.starts_with(IMAGE_MIME_PREFIX) {
            return Err(ApiError::UnsupportedFrame(frame.mime_type));
        }

        // Browsers hand out data URLs; accept them as-is.
        let encoded = match frame.image.split_once(";base64,") {
            Some((_, payload)) => payload,
            None => frame.image.as_str(),
        };
        if (encoded.len() as u64 / 4) * 3 > max_bytes + 2 {
            return Err(ApiError::FrameTooLarge { limit: max_bytes });
        }

        let data = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ApiError::InvalidFrame(e.to_string()))?;
        if data.is_empty() {
            return Err(ApiError::InvalidFrame("empty image".into()));
        }
        if data.len() as u64 > max_bytes {
            return Err(ApiError::FrameTooLarge { limit: max_bytes });
        }

        Ok(Self {
            session_id: frame.session_id,
            captured_at: frame.captured_at,
            mime_type: frame.mime_type,
            data,
        })
    }

    pub fn file_name(&self) -> String {
        let extension = self
            .mime_type
            .strip_prefix(IMAGE_MIME_PREFIX)
            .unwrap_or("bin");
        format!(
            "{}-{}.{}",
            self.session_id,
            self.captured_at.timestamp_millis(),
            extension
        )
    }
}

/// Reads the `video` field out of a multipart body.
///
/// The size limit is enforced while streaming, so an oversized upload is
/// refused as soon as it crosses the limit. Other fields are drained.
pub async fn read_video_upload(
    mut payload: Multipart,
    constraints: &UploadConstraints,
) -> Result<VideoUpload, ApiError> {
    let mut upload: Option<VideoUpload> = None;

    while let Some(mut field) = payload.try_next().await? {
        if field.name() != Some(VIDEO_FIELD) || upload.is_some() {
            while field.try_next().await?.is_some() {}
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        let mime_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();

        // An empty file name is how browsers submit "nothing selected".
        if !file_name.is_empty() {
            constraints.check_mime(&mime_type)?;
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            constraints.check_size((data.len() + chunk.len()) as u64)?;
            data.extend_from_slice(&chunk);
        }

        upload = Some(VideoUpload {
            file_name,
            mime_type,
            data,
        });
    }

    let upload = upload.ok_or(ApiError::MissingVideo)?;
    if upload.data.is_empty() {
        return Err(ApiError::EmptyVideo);
    }
    constraints.check_mime(&upload.mime_type)?;
    Ok(upload)
}

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
