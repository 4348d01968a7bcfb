use super::super::{Model, Msg};
use gloo_timers::callback::Timeout;
use js_sys::Date;
use shared::{Severity, Timestamp};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use yew::prelude::*;

pub fn generate_id() -> u64 {
    static ID_COUNTER: AtomicU64 = AtomicU64::new(0);
    let now = Date::now() as u64;
    let count = ID_COUNTER.fetch_add(1, Ordering::SeqCst);
    now * 1000 + (count % 1000)
}

// Debounce function to limit button events
pub fn debounce<F>(duration: u32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));

    Callback::from(move |_| {
        let mut timeout_ref = timeout.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        *timeout_ref = Some(Timeout::new(duration, move || {
            inner_callback();
        }));
    })
}

pub fn format_timestamp(timestamp: &Timestamp) -> String {
    timestamp.to_utc().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn severity_class(severity: Option<Severity>) -> &'static str {
    match severity {
        Some(Severity::Critical) => "badge-critical",
        Some(Severity::Warning) => "badge-warning",
        Some(Severity::Info) => "badge-info",
        None => "badge-none",
    }
}

pub fn render_error_message(model: &Model, ctx: &Context<Model>) -> Html {
    if let Some(error_msg) = &model.session.error {
        html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ error_msg }</p>
                <button
                    class="dismiss-btn"
                    title="Dismiss"
                    onclick={ctx.link().callback(|_| Msg::DismissError)}
                >
                    <i class="fa-solid fa-times"></i>
                </button>
            </div>
        }
    } else {
        html! {}
    }
}
