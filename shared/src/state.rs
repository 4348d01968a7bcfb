//! Dashboard session state as a plain value with a pure reducer.
//!
//! The view layer owns one [`SessionState`], feeds every event through
//! [`reduce`] and re-renders from the result. Browser handles (files,
//! object URLs, camera streams) stay outside; only their descriptions live
//! here.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::analytics::AnalyticsSummary;
use crate::error::GatewayError;
use crate::record::{ViolationKind, ViolationRecord};
use crate::validate::{MediaDescriptor, UploadProgress};
use crate::wire::ProcessResponse;

/// Most recent real-time records kept on screen.
pub const REALTIME_HISTORY_LIMIT: usize = 100;

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default, Display, AsRefStr, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum ProcessingStage {
    #[default]
    Idle,
    Uploading,
    Analyzing,
    Complete,
    Failed,
}

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default, Display, AsRefStr, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum ActiveView {
    #[default]
    Upload,
    Results,
    Analytics,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct RealtimeState {
    pub active: bool,
    pub connecting: bool,
    pub frames_analyzed: u64,
    /// Newest first.
    pub results: Vec<ViolationRecord>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct SessionState {
    pub selected: Option<MediaDescriptor>,
    pub stage: ProcessingStage,
    pub upload_progress: f32,
    pub results: Option<Vec<ViolationRecord>>,
    pub analytics: AnalyticsSummary,
    pub error: Option<String>,
    pub active_view: ActiveView,
    pub search: String,
    pub kind_filter: Option<ViolationKind>,
    pub realtime: RealtimeState,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    VideoSelected(MediaDescriptor),
    SelectionRejected(GatewayError),
    ClearVideo,
    UploadStarted,
    UploadProgressed(UploadProgress),
    UploadSent,
    /// A failed attempt is being sent again; progress restarts from zero.
    UploadRetrying,
    ProcessingSucceeded {
        response: ProcessResponse,
        elapsed_secs: f64,
    },
    ProcessingFailed(GatewayError),
    SetView(ActiveView),
    SetSearch(String),
    SetKindFilter(Option<ViolationKind>),
    DismissError,
    RealtimeRequested,
    RealtimeStarted,
    RealtimeFailed(GatewayError),
    RealtimeResults(Vec<ViolationRecord>),
    /// One frame could not be analyzed; streaming continues.
    RealtimeFrameFailed(GatewayError),
    RealtimeStopped,
}

impl SessionState {
    pub fn is_processing(&self) -> bool {
        matches!(
            self.stage,
            ProcessingStage::Uploading | ProcessingStage::Analyzing
        )
    }

    pub fn can_start_upload(&self) -> bool {
        self.selected.is_some() && !self.is_processing() && !self.realtime.active
    }

    /// Results whose plate matches the search text and that carry the
    /// selected violation kind, if any.
    pub fn filtered_results(&self) -> Vec<&ViolationRecord> {
        self.results
            .iter()
            .flatten()
            .filter(|r| r.matches_plate(&self.search))
            .filter(|r| self.kind_filter.is_none_or(|kind| r.has_kind(kind)))
            .collect()
    }
}

pub fn reduce(mut state: SessionState, action: Action) -> SessionState {
    match action {
        Action::VideoSelected(media) => {
            if state.is_processing() {
                return state;
            }
            state.selected = Some(media);
            state.results = None;
            state.error = None;
            state.stage = ProcessingStage::Idle;
            state.upload_progress = 0.0;
        }
        Action::SelectionRejected(err) => {
            state.error = Some(err.to_string());
        }
        Action::ClearVideo => {
            if state.is_processing() {
                return state;
            }
            state.selected = None;
            state.stage = ProcessingStage::Idle;
            state.upload_progress = 0.0;
        }
        Action::UploadStarted => {
            if !state.can_start_upload() {
                return state;
            }
            state.stage = ProcessingStage::Uploading;
            state.upload_progress = 0.0;
            state.results = None;
            state.error = None;
        }
        Action::UploadProgressed(progress) => {
            if state.stage == ProcessingStage::Uploading {
                state.upload_progress = state.upload_progress.max(progress.percent());
            }
        }
        Action::UploadSent => {
            if state.stage == ProcessingStage::Uploading {
                state.upload_progress = 100.0;
                state.stage = ProcessingStage::Analyzing;
            }
        }
        Action::UploadRetrying => {
            if state.is_processing() {
                state.stage = ProcessingStage::Uploading;
                state.upload_progress = 0.0;
            }
        }
        Action::ProcessingSucceeded {
            response,
            elapsed_secs,
        } => {
            if !state.is_processing() {
                return state;
            }
            let processing_time = response.processing_time_secs.unwrap_or(elapsed_secs);
            state.analytics = AnalyticsSummary::from_records(&response.results, processing_time);
            state.results = Some(response.results);
            state.upload_progress = 100.0;
            state.stage = ProcessingStage::Complete;
            state.active_view = ActiveView::Results;
        }
        Action::ProcessingFailed(err) => {
            if !state.is_processing() {
                return state;
            }
            state.error = Some(err.to_string());
            state.results = None;
            state.stage = ProcessingStage::Failed;
            state.upload_progress = 0.0;
        }
        Action::SetView(view) => state.active_view = view,
        Action::SetSearch(search) => state.search = search,
        Action::SetKindFilter(kind) => state.kind_filter = kind,
        Action::DismissError => state.error = None,
        Action::RealtimeRequested => {
            if state.is_processing() || state.realtime.active {
                return state;
            }
            state.error = None;
            state.active_view = ActiveView::Upload;
            state.realtime = RealtimeState {
                active: true,
                connecting: true,
                ..RealtimeState::default()
            };
        }
        Action::RealtimeStarted => {
            if state.realtime.active {
                state.realtime.connecting = false;
            }
        }
        Action::RealtimeFailed(err) => {
            state.error = Some(err.to_string());
            state.realtime = RealtimeState::default();
        }
        Action::RealtimeResults(records) => {
            if !state.realtime.active {
                return state;
            }
            state.realtime.frames_analyzed += 1;
            let mut merged = records;
            merged.append(&mut state.realtime.results);
            merged.truncate(REALTIME_HISTORY_LIMIT);
            state.realtime.results = merged;
            state.error = None;
        }
        Action::RealtimeFrameFailed(err) => {
            if state.realtime.active {
                state.error = Some(err.to_string());
            }
        }
        Action::RealtimeStopped => state.realtime = RealtimeState::default(),
    }
    state
}
