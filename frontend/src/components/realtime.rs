use super::super::{Model, Msg};
use super::results::render_violation_badges;
use super::utils::format_timestamp;
use yew::prelude::*;

pub fn render_realtime(model: &Model, ctx: &Context<Model>) -> Html {
    let realtime = &model.session.realtime;
    if !realtime.active {
        return html! {};
    }

    let status = if realtime.connecting {
        "Waiting for camera permission...".to_string()
    } else {
        format!("Live | {} frames analyzed", realtime.frames_analyzed)
    };

    html! {
        <div class="realtime-container">
            <video
                id="camera-feed"
                ref={model.video_ref.clone()}
                autoplay=true
                muted=true
                playsinline=true
            />
            <div class="realtime-status">
                <i class={classes!("fa-solid", if realtime.connecting { vec!["fa-spinner", "fa-spin"] } else { vec!["fa-circle", "live"] })}></i>
                <span>{ status }</span>
            </div>
            <div class="button-container">
                <button
                    class="analyze-btn"
                    style="background-color: var(--danger-color);"
                    onclick={ctx.link().callback(|_| Msg::StopRealtime)}
                >
                    <i class="fa-solid fa-stop"></i>{" Stop"}
                </button>
            </div>
            <ul class="realtime-feed">
                { for realtime.results.iter().map(|record| html! {
                    <li key={record.id.clone()}>
                        <span class="plate">{ &record.plate_number }</span>
                        { render_violation_badges(record) }
                        <span class="timestamp">{ format_timestamp(&record.timestamp) }</span>
                    </li>
                })}
            </ul>
        </div>
    }
}
