use shared::GatewayError;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};

use crate::api::js_error_text;

pub const FRAME_MIME: &str = "image/jpeg";
const FRAME_QUALITY: f64 = 0.8;

/// A live webcam stream. Every track is stopped when the session is dropped,
/// which turns the camera indicator off.
pub struct CameraSession {
    stream: MediaStream,
}

impl CameraSession {
    pub async fn open() -> Result<Self, GatewayError> {
        let denied = |err: JsValue| GatewayError::CameraAccessDenied(js_error_text(&err));

        let window = web_sys::window()
            .ok_or_else(|| GatewayError::CameraAccessDenied("no browser window".into()))?;
        let devices = window.navigator().media_devices().map_err(denied)?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&JsValue::TRUE);
        let pending = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(denied)?;
        let stream = JsFuture::from(pending).await.map_err(denied)?;

        Ok(Self {
            stream: stream.dyn_into::<MediaStream>().map_err(denied)?,
        })
    }

    pub fn attach(&self, video: &HtmlVideoElement) {
        video.set_src_object(Some(&self.stream));
        if let Err(err) = video.play() {
            log::warn!("Camera preview did not start: {}", js_error_text(&err));
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
        log::info!("Camera released");
    }
}

/// Grabs the current video frame as a JPEG data URL. `None` until the
/// stream has produced its first frame.
pub fn capture_frame(video: &HtmlVideoElement) -> Result<Option<String>, JsValue> {
    let (width, height) = (video.video_width(), video.video_height());
    if width == 0 || height == 0 {
        return Ok(None);
    }

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_width(width);
    canvas.set_height(height);

    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()?;
    context.draw_image_with_html_video_element(video, 0.0, 0.0)?;

    canvas
        .to_data_url_with_type_and_encoder_options(FRAME_MIME, &JsValue::from_f64(FRAME_QUALITY))
        .map(Some)
}
