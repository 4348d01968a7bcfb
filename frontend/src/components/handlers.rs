use super::super::{FileData, Model, Msg};
use super::utils::generate_id;
use crate::api::{self, VideoFile, js_error_text};
use crate::camera::{self, CameraSession, FRAME_MIME};
use chrono::Utc;
use gloo_file::{File as GlooFile, ObjectUrl};
use gloo_timers::callback::Interval;
use js_sys::Date;
use shared::{
    Action, GatewayError, ProcessResponse, RealtimeFrame, UploadConstraints, VideoSource,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent, FileList, HtmlVideoElement};
use yew::prelude::*;

const FRAME_INTERVAL_MS: u32 = 2000;

pub fn handle_file_chosen(model: &mut Model, file: web_sys::File) -> bool {
    if model.session.is_processing() {
        return false;
    }

    let video = VideoFile(file);
    let media = video.descriptor();
    if let Err(err) = UploadConstraints::default().check(&media) {
        log::warn!("Rejected {}: {}", media.name, err);
        model.dispatch(Action::SelectionRejected(err));
        return true;
    }

    let preview_url = ObjectUrl::from(GlooFile::from(video.0.clone()));
    // Replacing the previous selection drops (and revokes) its preview URL.
    model.file = Some(FileData { video, preview_url });
    model.dispatch(Action::VideoSelected(media));
    true
}

pub fn handle_clear_file(model: &mut Model) -> bool {
    if model.session.is_processing() {
        return false;
    }
    model.file = None;
    model.dispatch(Action::ClearVideo);
    true
}

pub fn handle_drop(model: &mut Model, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(file) = event
        .data_transfer()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|files| first_file(&files))
    {
        handle_file_chosen(model, file);
    }

    true
}

pub fn handle_paste(model: &mut Model, event: ClipboardEvent) -> bool {
    let file = event
        .clipboard_data()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|files| first_file(&files));

    match file {
        Some(file) => {
            event.prevent_default();
            handle_file_chosen(model, file)
        }
        None => false,
    }
}

pub fn handle_process_video(model: &mut Model, ctx: &Context<Model>) -> bool {
    if !model.session.can_start_upload() {
        return false;
    }
    let Some(file_data) = &model.file else {
        return false;
    };

    let video = file_data.video.clone();
    log::info!("Uploading {}", video.0.name());
    model.upload_started_at = Date::now();
    model.dispatch(Action::UploadStarted);
    api::upload_video(ctx.link().clone(), video);
    true
}

pub fn handle_processing_finished(
    model: &mut Model,
    result: Result<ProcessResponse, GatewayError>,
) -> bool {
    match result {
        Ok(response) => {
            let elapsed_secs = (Date::now() - model.upload_started_at) / 1000.0;
            log::info!(
                "Processing finished with {} records in {:.1}s",
                response.results.len(),
                elapsed_secs
            );
            model.dispatch(Action::ProcessingSucceeded {
                response,
                elapsed_secs,
            });
        }
        Err(err) => {
            log::error!("Processing failed: {}", err);
            model.dispatch(Action::ProcessingFailed(err));
        }
    }
    true
}

pub fn handle_start_realtime(model: &mut Model, ctx: &Context<Model>) -> bool {
    if model.session.is_processing() || model.session.realtime.active {
        return false;
    }
    model.dispatch(Action::RealtimeRequested);

    let link = ctx.link().clone();
    spawn_local(async move {
        match CameraSession::open().await {
            Ok(camera) => link.send_message(Msg::CameraReady(camera)),
            Err(err) => link.send_message(Msg::CameraFailed(err)),
        }
    });
    true
}

pub fn handle_camera_ready(model: &mut Model, ctx: &Context<Model>, camera: CameraSession) -> bool {
    // Stopped while the permission prompt was open.
    if !model.session.realtime.active {
        return false;
    }

    model.camera = Some(camera);
    model.realtime_session = format!("rt-{}", generate_id());
    model.frame_in_flight = false;

    let link = ctx.link().clone();
    model.frame_timer = Some(Interval::new(FRAME_INTERVAL_MS, move || {
        link.send_message(Msg::CaptureFrame)
    }));

    log::info!("Real-time session {} started", model.realtime_session);
    model.dispatch(Action::RealtimeStarted);
    true
}

pub fn handle_capture_frame(model: &mut Model, ctx: &Context<Model>) -> bool {
    if model.frame_in_flight || model.camera.is_none() {
        return false;
    }
    let Some(video) = model.video_ref.cast::<HtmlVideoElement>() else {
        log::warn!("Camera feed is not mounted, skipping frame");
        return false;
    };

    match camera::capture_frame(&video) {
        Ok(Some(image)) => {
            model.frame_in_flight = true;
            api::send_frame(
                ctx.link().clone(),
                RealtimeFrame {
                    session_id: model.realtime_session.clone(),
                    captured_at: Utc::now(),
                    mime_type: FRAME_MIME.to_string(),
                    image,
                },
            );
        }
        Ok(None) => log::debug!("Camera not ready, skipping frame"),
        Err(err) => log::warn!("Frame capture failed: {}", js_error_text(&err)),
    }
    false
}

pub fn handle_frame_analyzed(
    model: &mut Model,
    result: Result<ProcessResponse, GatewayError>,
) -> bool {
    model.frame_in_flight = false;
    match result {
        Ok(response) => model.dispatch(Action::RealtimeResults(response.results)),
        Err(err) => {
            log::warn!("Frame analysis failed: {}", err);
            model.dispatch(Action::RealtimeFrameFailed(err));
        }
    }
    true
}

pub fn handle_stop_realtime(model: &mut Model) -> bool {
    model.frame_timer = None;
    model.frame_in_flight = false;
    if let Some(video) = model.video_ref.cast::<HtmlVideoElement>() {
        video.set_src_object(None);
    }
    model.camera = None;
    model.dispatch(Action::RealtimeStopped);
    true
}

fn first_file(files: &FileList) -> Option<web_sys::File> {
    (0..files.length()).find_map(|i| files.item(i))
}
