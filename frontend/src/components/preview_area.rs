use super::super::{Model, Msg};
use super::utils::debounce;
use shared::ProcessingStage;
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let (Some(file_data), Some(media)) = (&model.file, &model.session.selected) else {
        return html! {};
    };

    let link = ctx.link().clone();
    let busy = model.session.is_processing();

    html! {
        <div id="preview-container">
            <video
                id="video-preview"
                src={file_data.preview_url.to_string()}
                controls=true
            />
            <div class="file-info">
                <i class="fa-solid fa-film"></i>
                <span class="file-name" title={media.name.clone()}>{ &media.name }</span>
                <span class="file-size">{ media.size_mb() }</span>
            </div>
            { render_progress(model) }
            <div class="button-container">
                <button
                    id="clear-btn"
                    class="analyze-btn"
                    style="background-color: var(--clear-color);"
                    disabled={busy}
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::ClearFile)
                    })}
                >
                    <i class="fa-solid fa-trash"></i>{" Remove"}
                </button>
                <button
                    class="analyze-btn"
                    disabled={!model.session.can_start_upload()}
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::ProcessVideo)
                    })}
                >
                    { render_process_button_content(model) }
                </button>
            </div>
        </div>
    }
}

fn render_progress(model: &Model) -> Html {
    let label = match model.session.stage {
        ProcessingStage::Idle => return html! {},
        ProcessingStage::Uploading => {
            format!("Uploading... {:.0}%", model.session.upload_progress)
        }
        ProcessingStage::Analyzing => "Analyzing video...".to_string(),
        ProcessingStage::Complete => "Analysis complete".to_string(),
        ProcessingStage::Failed => "Processing failed".to_string(),
    };

    html! {
        <div class={classes!("progress", model.session.stage.to_string())}>
            <div class="progress-label">{ label }</div>
            <div class="meter">
                <div
                    class="meter-fill"
                    style={format!("width: {:.0}%", model.session.upload_progress)}
                ></div>
            </div>
        </div>
    }
}

fn render_process_button_content(model: &Model) -> Html {
    if model.session.is_processing() {
        html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Processing..."}</> }
    } else {
        html! { <><i class="fa-solid fa-magnifying-glass"></i>{" Process Video"}</> }
    }
}
