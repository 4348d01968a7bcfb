use super::super::{Model, Msg};
use shared::ActiveView;
use yew::prelude::*;

/// Renders the application header and the view tabs
pub fn render_header(model: &Model, ctx: &Context<Model>) -> Html {
    let tab = |view: ActiveView, icon: &'static str, label: &'static str| {
        let is_active = model.session.active_view == view;
        html! {
            <button
                class={classes!("tab", is_active.then_some("active"))}
                onclick={ctx.link().callback(move |_| Msg::SetView(view))}
            >
                <i class={classes!("fa-solid", icon)}></i>{ format!(" {}", label) }
            </button>
        }
    };

    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-traffic-light"></i> {" Traffic Violation Detection"}</h1>
            <p class="subtitle">{"Upload traffic footage or stream your camera to detect violations"}</p>
            <nav class="tabs">
                { tab(ActiveView::Upload, "fa-upload", "Upload") }
                { tab(ActiveView::Results, "fa-table", "Results") }
                { tab(ActiveView::Analytics, "fa-chart-pie", "Analytics") }
            </nav>
        </header>
    }
}
