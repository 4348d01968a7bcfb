use super::super::{Model, Msg};
use super::utils::debounce;
use shared::wire::VIDEO_MIME_PREFIX;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    if model.file.is_some() || model.session.realtime.active {
        return html! {};
    }

    let link = ctx.link();
    let handle_change = link.batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().and_then(|files| files.item(0));

        input.set_value("");
        file.map(Msg::FileChosen)
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);
    let trigger_file_input = Callback::from(|_| {
        if let Some(input) = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id("file-input"))
        {
            if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                html_input.click();
            }
        }
    });

    html! {
        <>
            <input
                type="file"
                id="file-input"
                accept={format!("{}*", VIDEO_MIME_PREFIX)}
                style="display: none;"
                onchange={handle_change}
            />

            <div
                id="drop-zone"
                class={classes!("upload-area", model.is_dragging.then_some("drag-over"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={debounce(300, {
                    let trigger_file_input = trigger_file_input.clone();
                    move || trigger_file_input.emit(())
                })}
            >
                <div class="upload-placeholder">
                    <i class="fa-solid fa-cloud-arrow-up"></i>
                    <p>{"Drag & drop a video here, paste, or click to browse"}</p>
                    <p class="file-types">{"Supported formats: MP4, AVI, MOV (max 100MB)"}</p>
                </div>
            </div>

            <div class="button-container">
                <button
                    class="analyze-btn"
                    style="background-color: var(--primary-color);"
                    onclick={link.callback(|_| Msg::StartRealtime)}
                >
                    <i class="fa-solid fa-video"></i>{" Real-time Detection"}
                </button>
            </div>
        </>
    }
}
