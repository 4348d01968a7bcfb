use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::error::JsonPayloadError;
use actix_web::{HttpResponse, web};
use log::{error, info, warn};
use shared::wire::{HEALTH_PATH, PROCESS_VIDEO_PATH, REALTIME_FRAME_PATH};
use shared::{HealthResponse, ProcessResponse, RealtimeFrame};
use std::path::PathBuf;
use std::time::Instant;
use uuid::Uuid;

use crate::AppState;
use crate::detector::DetectorError;
use crate::error::ApiError;
use crate::upload::{FrameUpload, read_video_upload};

/// Registers shared state, the JSON limits and all API routes.
pub fn configure_app(cfg: &mut web::ServiceConfig, state: web::Data<AppState>) {
    let max_frame_bytes = state.limits.max_frame_bytes;
    // Base64 inflates by 4/3; leave headroom for the other fields.
    let json_limit = usize::try_from(max_frame_bytes / 3 * 4 + 4096).unwrap_or(usize::MAX);

    cfg.app_data(state)
        .app_data(
            web::JsonConfig::default()
                .limit(json_limit)
                .error_handler(move |err, _req| {
                    let api_error = match err {
                        JsonPayloadError::OverflowKnownLength { .. }
                        | JsonPayloadError::Overflow { .. } => ApiError::FrameTooLarge {
                            limit: max_frame_bytes,
                        },
                        other => ApiError::InvalidFrame(other.to_string()),
                    };
                    api_error.into()
                }),
        )
        .service(web::resource(PROCESS_VIDEO_PATH).route(web::post().to(process_video)))
        .service(web::resource(REALTIME_FRAME_PATH).route(web::post().to(realtime_frame)))
        .service(web::resource(HEALTH_PATH).route(web::get().to(health)));
}

/// Serves the built dashboard. Must be registered after the API routes.
pub fn configure_frontend(cfg: &mut web::ServiceConfig, frontend_dir: PathBuf) {
    if frontend_dir.is_dir() {
        cfg.service(Files::new("/", frontend_dir).index_file("index.html"));
    } else {
        warn!(
            "Frontend directory {} not found, serving the API only",
            frontend_dir.display()
        );
    }
}

async fn process_video(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();

    let upload = read_video_upload(payload, &state.upload_constraints())
        .await
        .inspect_err(|e| warn!("[{}] Upload refused: {}", request_id, e))?;

    info!(
        "[{}] Received {} ({} bytes, {}, sha256 {})",
        request_id,
        upload.file_name,
        upload.size(),
        upload.mime_type,
        upload.digest()
    );

    let _permit = state.jobs.acquire().await.map_err(|_| {
        ApiError::Detector(DetectorError::Internal("job queue closed".into()))
    })?;

    let started = Instant::now();
    let results = state
        .detector
        .detect_video(&upload)
        .await
        .inspect_err(|e| error!("[{}] Detection failed: {:?}", request_id, e))?;
    let elapsed = started.elapsed().as_secs_f64();

    info!(
        "[{}] {} violation records in {:.2}s",
        request_id,
        results.len(),
        elapsed
    );

    Ok(HttpResponse::Ok().json(ProcessResponse {
        results,
        processing_time_secs: Some(elapsed),
    }))
}

async fn realtime_frame(
    state: web::Data<AppState>,
    frame: web::Json<RealtimeFrame>,
) -> Result<HttpResponse, ApiError> {
    let frame = FrameUpload::decode(frame.into_inner(), state.limits.max_frame_bytes)?;

    let _permit = state.jobs.acquire().await.map_err(|_| {
        ApiError::Detector(DetectorError::Internal("job queue closed".into()))
    })?;

    let started = Instant::now();
    let results = state
        .detector
        .detect_frame(&frame)
        .await
        .inspect_err(|e| error!("Frame detection for {} failed: {:?}", frame.session_id, e))?;

    Ok(HttpResponse::Ok().json(ProcessResponse {
        results,
        processing_time_secs: Some(started.elapsed().as_secs_f64()),
    }))
}

async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        detector: state.detector.name().to_string(),
    })
}
