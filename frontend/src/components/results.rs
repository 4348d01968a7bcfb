use super::super::{Model, Msg};
use super::utils::{format_timestamp, severity_class};
use shared::{ViolationKind, ViolationRecord};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

const FILTER_KINDS: [ViolationKind; 4] = [
    ViolationKind::NoHelmet,
    ViolationKind::Speeding,
    ViolationKind::RedLight,
    ViolationKind::LicensePlate,
];

pub fn render_results(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(all) = &model.session.results else {
        return html! {
            <p class="no-results-message">{"No results yet. Upload a video to start detection."}</p>
        };
    };

    let handle_search = ctx.link().callback(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::SetSearch(input.value())
    });
    let handle_kind = ctx.link().callback(|e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        Msg::SetKindFilter(select.value().parse::<ViolationKind>().ok())
    });
    let selected_kind = model.session.kind_filter;
    let filtered = model.session.filtered_results();

    html! {
        <div class="results-container">
            <div class="result-header">
                <h2>{ format!("Detected Violations ({})", all.len()) }</h2>
                <input
                    type="search"
                    class="search-input"
                    placeholder="Search by plate number"
                    value={model.session.search.clone()}
                    oninput={handle_search}
                />
                <select class="kind-filter" title="Filter by violation" onchange={handle_kind}>
                    <option value="" selected={selected_kind.is_none()}>{"All violations"}</option>
                    { for FILTER_KINDS.iter().map(|kind| html! {
                        <option value={kind.to_string()} selected={selected_kind == Some(*kind)}>
                            { kind.to_string() }
                        </option>
                    })}
                </select>
            </div>
            {
                if filtered.is_empty() {
                    html! { <p class="no-results-message">{"No violations match these filters."}</p> }
                } else {
                    html! {
                        <table class="results-table">
                            <thead>
                                <tr>
                                    <th>{"Screenshot"}</th>
                                    <th>{"Plate"}</th>
                                    <th>{"Vehicle"}</th>
                                    <th>{"Violations"}</th>
                                    <th>{"Confidence"}</th>
                                    <th>{"Time"}</th>
                                </tr>
                            </thead>
                            <tbody>
                                { for filtered.into_iter().map(render_row) }
                            </tbody>
                        </table>
                    }
                }
            }
        </div>
    }
}

fn render_row(record: &ViolationRecord) -> Html {
    html! {
        <tr key={record.id.clone()} class={severity_class(record.severity())}>
            <td><img class="screenshot" src={record.screenshot.clone()} alt={record.plate_number.clone()} /></td>
            <td class="plate">{ &record.plate_number }</td>
            <td>{ &record.vehicle_type }</td>
            <td>{ render_violation_badges(record) }</td>
            <td>{ record.confidence_percent() }</td>
            <td>{ format_timestamp(&record.timestamp) }</td>
        </tr>
    }
}

pub fn render_violation_badges(record: &ViolationRecord) -> Html {
    record
        .violations
        .iter()
        .zip(record.kinds())
        .map(|(text, kind)| {
            html! {
                <span class={classes!("badge", severity_class(Some(kind.severity())))}>
                    { text }
                </span>
            }
        })
        .collect::<Html>()
}
