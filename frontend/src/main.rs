mod api;
mod camera;
mod components;

use camera::CameraSession;
use components::analytics::render_analytics;
use components::handlers;
use components::header::render_header;
use components::preview_area::render_preview_area;
use components::realtime::render_realtime;
use components::results::render_results;
use components::upload_section::render_upload_section;
use components::utils::render_error_message;
use gloo_events::EventListener;
use gloo_file::ObjectUrl;
use gloo_timers::callback::Interval;
use shared::{
    Action, ActiveView, GatewayError, ProcessResponse, SessionState, UploadProgress,
    ViolationKind, state::reduce,
};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent, HtmlVideoElement};
use yew::prelude::*;

// Models
struct FileData {
    video: api::VideoFile,
    preview_url: ObjectUrl,
}

// Yew msg components
enum Msg {
    // File operations
    FileChosen(web_sys::File),
    ClearFile,

    // Upload lifecycle
    ProcessVideo,
    UploadProgress(UploadProgress),
    UploadSent,
    UploadRetrying(u32),
    ProcessingFinished(Result<ProcessResponse, GatewayError>),

    // Real-time detection
    StartRealtime,
    CameraReady(CameraSession),
    CameraFailed(GatewayError),
    CaptureFrame,
    FrameAnalyzed(Result<ProcessResponse, GatewayError>),
    StopRealtime,

    // UI states
    SetView(ActiveView),
    SetSearch(String),
    SetKindFilter(Option<ViolationKind>),
    DismissError,
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

// Main component
struct Model {
    session: SessionState,
    file: Option<FileData>,
    is_dragging: bool,
    paste_listener: Option<EventListener>,
    upload_started_at: f64,
    camera: Option<CameraSession>,
    frame_timer: Option<Interval>,
    frame_in_flight: bool,
    realtime_session: String,
    video_ref: NodeRef,
}

impl Model {
    fn dispatch(&mut self, action: Action) {
        self.session = reduce(std::mem::take(&mut self.session), action);
    }
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let mut model = Self {
            session: SessionState::default(),
            file: None,
            is_dragging: false,
            paste_listener: None,
            upload_started_at: 0.0,
            camera: None,
            frame_timer: None,
            frame_in_flight: false,
            realtime_session: String::new(),
            video_ref: NodeRef::default(),
        };

        let link = ctx.link().clone();
        if let Some(window) = web_sys::window() {
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        }

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            // File operations
            Msg::FileChosen(file) => handlers::handle_file_chosen(self, file),
            Msg::ClearFile => handlers::handle_clear_file(self),

            // Upload lifecycle
            Msg::ProcessVideo => handlers::handle_process_video(self, ctx),
            Msg::UploadProgress(progress) => {
                self.dispatch(Action::UploadProgressed(progress));
                true
            }
            Msg::UploadSent => {
                self.dispatch(Action::UploadSent);
                true
            }
            Msg::UploadRetrying(attempt) => {
                log::info!("Retrying upload, attempt {}", attempt);
                self.dispatch(Action::UploadRetrying);
                true
            }
            Msg::ProcessingFinished(result) => handlers::handle_processing_finished(self, result),

            // Real-time detection
            Msg::StartRealtime => handlers::handle_start_realtime(self, ctx),
            Msg::CameraReady(camera) => handlers::handle_camera_ready(self, ctx, camera),
            Msg::CameraFailed(err) => {
                log::warn!("Camera unavailable: {}", err);
                self.dispatch(Action::RealtimeFailed(err));
                true
            }
            Msg::CaptureFrame => handlers::handle_capture_frame(self, ctx),
            Msg::FrameAnalyzed(result) => handlers::handle_frame_analyzed(self, result),
            Msg::StopRealtime => handlers::handle_stop_realtime(self),

            // UI states
            Msg::SetView(view) => {
                self.dispatch(Action::SetView(view));
                true
            }
            Msg::SetSearch(search) => {
                self.dispatch(Action::SetSearch(search));
                true
            }
            Msg::SetKindFilter(kind) => {
                self.dispatch(Action::SetKindFilter(kind));
                true
            }
            Msg::DismissError => {
                self.dispatch(Action::DismissError);
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            // Input events
            Msg::HandleDrop(event) => handlers::handle_drop(self, event),
            Msg::HandlePaste(event) => handlers::handle_paste(self, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let body = match self.session.active_view {
            ActiveView::Upload => html! {
                <div class="upload-section">
                    { render_upload_section(self, ctx) }
                    { render_preview_area(self, ctx) }
                </div>
            },
            ActiveView::Results => render_results(self, ctx),
            ActiveView::Analytics => render_analytics(self),
        };

        html! {
            <div class="container">
                { render_header(self, ctx) }

                <main class="main-content">
                { render_error_message(self, ctx) }
                // Stays mounted on every tab so frame capture keeps its video element.
                { render_realtime(self, ctx) }
                { body }
                </main>

                <footer class="app-footer">
                    <p>{"Traffic Violation Detection | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        // The feed element is recreated whenever a real-time session starts.
        if let (Some(camera), Some(video)) = (&self.camera, self.video_ref.cast::<HtmlVideoElement>()) {
            if video.src_object().is_none() {
                camera.attach(&video);
            }
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        handlers::handle_stop_realtime(self);
        self.file = None;
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Dashboard starting...");
    yew::Renderer::<Model>::new().render();
}
