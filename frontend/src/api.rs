use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use shared::wire::{PROCESS_VIDEO_PATH, REALTIME_FRAME_PATH, VIDEO_FIELD, decode_response};
use shared::{
    GatewayError, MediaDescriptor, ProcessResponse, RealtimeFrame, RetryPolicy, TransportResponse,
    UploadConstraints, UploadProgress, UploadTransport, VideoSource, submit,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{FormData, ProgressEvent, XmlHttpRequest};
use yew::html::Scope;
use yew::Callback;

use crate::{Model, Msg};

const UPLOAD_ATTEMPTS: u32 = 3;
const UPLOAD_BACKOFF: Duration = Duration::from_millis(500);

/// A browser file picked for upload.
#[derive(Clone)]
pub struct VideoFile(pub web_sys::File);

impl VideoSource for VideoFile {
    fn descriptor(&self) -> MediaDescriptor {
        MediaDescriptor {
            name: self.0.name(),
            size: self.0.size() as u64,
            mime_type: self.0.type_(),
        }
    }
}

/// Multipart upload over `XMLHttpRequest`, which is the only browser API
/// that reports upload progress.
pub struct XhrTransport {
    endpoint: String,
    on_progress: Callback<UploadProgress>,
    on_sent: Callback<()>,
    on_retry: Callback<u32>,
}

impl XhrTransport {
    pub fn new(
        endpoint: impl Into<String>,
        on_progress: Callback<UploadProgress>,
        on_sent: Callback<()>,
        on_retry: Callback<u32>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            on_progress,
            on_sent,
            on_retry,
        }
    }
}

impl UploadTransport for XhrTransport {
    type Source = VideoFile;

    async fn send(&self, source: &VideoFile) -> Result<TransportResponse, GatewayError> {
        let xhr = XmlHttpRequest::new().map_err(network_error)?;
        xhr.open_with_async("POST", &self.endpoint, true)
            .map_err(network_error)?;

        let form = FormData::new().map_err(network_error)?;
        form.append_with_blob_and_filename(VIDEO_FIELD, &source.0, &source.0.name())
            .map_err(network_error)?;

        let on_progress = self.on_progress.clone();
        let progress = Closure::<dyn FnMut(ProgressEvent)>::new(move |event: ProgressEvent| {
            if event.length_computable() {
                on_progress.emit(UploadProgress {
                    sent: event.loaded() as u64,
                    total: event.total() as u64,
                });
            }
        });
        let on_sent = self.on_sent.clone();
        let sent = Closure::<dyn FnMut()>::new(move || on_sent.emit(()));

        let (tx, rx) = oneshot::channel::<()>();
        let tx = Rc::new(RefCell::new(Some(tx)));
        let finished = Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(());
            }
        });

        let upload = xhr.upload().map_err(network_error)?;
        upload.set_onprogress(Some(progress.as_ref().unchecked_ref()));
        upload.set_onload(Some(sent.as_ref().unchecked_ref()));
        xhr.set_onloadend(Some(finished.as_ref().unchecked_ref()));

        xhr.send_with_opt_form_data(Some(&form))
            .map_err(network_error)?;
        let _ = rx.await;

        upload.set_onprogress(None);
        upload.set_onload(None);
        xhr.set_onloadend(None);

        // Status 0 means the request never got an HTTP answer.
        let status = xhr.status().map_err(network_error)?;
        if status == 0 {
            return Err(GatewayError::NetworkFailure(
                "the server could not be reached".into(),
            ));
        }
        let body = xhr
            .response_text()
            .map_err(network_error)?
            .unwrap_or_default();

        Ok(TransportResponse { status, body })
    }

    async fn pause(&self, delay: Duration) {
        TimeoutFuture::new(delay.as_millis() as u32).await;
    }

    fn retrying(&self, attempt: u32) {
        self.on_retry.emit(attempt);
    }
}

pub fn upload_retry_policy() -> RetryPolicy {
    RetryPolicy::network(UPLOAD_ATTEMPTS, UPLOAD_BACKOFF)
}

pub fn upload_video(link: Scope<Model>, video: VideoFile) {
    spawn_local(async move {
        let transport = XhrTransport::new(
            PROCESS_VIDEO_PATH,
            link.callback(Msg::UploadProgress),
            link.callback(|_: ()| Msg::UploadSent),
            link.callback(Msg::UploadRetrying),
        );
        let result = submit(
            &transport,
            &video,
            &UploadConstraints::default(),
            &upload_retry_policy(),
        )
        .await;
        link.send_message(Msg::ProcessingFinished(result));
    });
}

pub fn send_frame(link: Scope<Model>, frame: RealtimeFrame) {
    spawn_local(async move {
        let result = post_frame(&frame).await;
        link.send_message(Msg::FrameAnalyzed(result));
    });
}

async fn post_frame(frame: &RealtimeFrame) -> Result<ProcessResponse, GatewayError> {
    let request = Request::post(REALTIME_FRAME_PATH)
        .json(frame)
        .map_err(|e| GatewayError::NetworkFailure(e.to_string()))?;
    let response = request
        .send()
        .await
        .map_err(|e| GatewayError::NetworkFailure(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::NetworkFailure(e.to_string()))?;

    decode_response(status, &body)
}

fn network_error(err: JsValue) -> GatewayError {
    GatewayError::NetworkFailure(js_error_text(&err))
}

pub fn js_error_text(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    match err.dyn_ref::<js_sys::Error>() {
        Some(error) => String::from(error.message()),
        None => format!("{:?}", err),
    }
}
