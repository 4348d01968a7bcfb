use super::super::Model;
use yew::prelude::*;

pub fn render_analytics(model: &Model) -> Html {
    if model.session.results.is_none() {
        return html! {
            <p class="no-results-message">{"Analytics appear once a video has been processed."}</p>
        };
    }

    let summary = &model.session.analytics;
    let breakdown = [
        ("No helmet", summary.no_helmet_count),
        ("Speeding", summary.speeding_count),
        ("Red light", summary.red_light_count),
        ("License plate", summary.license_plate_issues),
        ("Other", summary.other_count()),
    ];

    html! {
        <div class="analytics-container">
            <div class="stat-cards">
                { stat_card("fa-car", "Vehicles flagged", summary.total_violations.to_string()) }
                { stat_card("fa-triangle-exclamation", "Violations", summary.violation_events.to_string()) }
                { stat_card("fa-clock", "Processing time", format!("{:.1}s", summary.processing_time_secs)) }
            </div>
            <h3>{"Violation Breakdown"}</h3>
            <div class="result-bars">
                { for breakdown.iter().map(|(label, count)| {
                    let percentage = summary.share(*count);
                    html! {
                        <div class="result-item">
                            <div class="result-label">{ *label }</div>
                            <div class="result-bar-container">
                                <div class="result-bar" style={format!("width: {:.1}%", percentage)}></div>
                            </div>
                            <div class="result-value">{ format!("{} ({:.1}%)", count, percentage) }</div>
                        </div>
                    }
                })}
            </div>
        </div>
    }
}

fn stat_card(icon: &'static str, label: &'static str, value: String) -> Html {
    html! {
        <div class="stat-card">
            <i class={classes!("fa-solid", icon)}></i>
            <div class="stat-value">{ value }</div>
            <div class="stat-label">{ label }</div>
        </div>
    }
}
