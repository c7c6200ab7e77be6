//! One transcript entry: user bubble, activity indicator, or bot answer with
//! its details panel and drill-down control.

#[cfg(test)]
#[path = "message_card_test.rs"]
mod message_card_test;

use chat::markdown::render_html;
use chat::{ChatSession, DetailsView, MessageView, MoreInfoResult};
use leptos::prelude::*;

use crate::state::session::{ChatRuntime, request_more_info};

pub const BOT_NAME: &str = "Gemini";

#[component]
pub fn MessageCard(message: MessageView) -> impl IntoView {
    match message {
        MessageView::User { text, .. } => view! {
            <div class="message message--user">
                <div class="message__bubble">{text}</div>
            </div>
        }
        .into_any(),
        MessageView::Activity { .. } => view! {
            <div class="message message--bot">
                <div class="typing-indicator" aria-label="Waiting for answer">
                    <span></span>
                    <span></span>
                    <span></span>
                </div>
            </div>
        }
        .into_any(),
        MessageView::Bot { index, text, details } => {
            let is_error = details.is_none() && is_error_text(&text);
            view! {
                <div class="message message--bot" class:message--error=is_error>
                    <div class="message__bubble">
                        <div class="message__author">{BOT_NAME}</div>
                        <div class="message__markdown" inner_html=render_html(&text)></div>
                        {details.map(|details| view! { <DetailsPanel index=index details=details/> })}
                    </div>
                </div>
            }
            .into_any()
        }
    }
}

#[component]
fn DetailsPanel(index: usize, details: DetailsView) -> impl IntoView {
    let session = expect_context::<RwSignal<ChatSession>>();
    let runtime = expect_context::<ChatRuntime>();

    let label = details.drill_down.label();
    let disabled = !matches!(details.drill_down, chat::DrillDownControl::Enabled);
    let on_more_info = move |_| {
        if let Err(e) = request_more_info(session, &runtime, index) {
            log::debug!("more information refused: {e}");
        }
    };

    view! {
        <div class="message__details">
            <p class="message__meta">{format!("Search Method: {}", details.search_method)}</p>
            <p class="message__meta">{format!("Table Used: {}", details.table_used)}</p>

            <details class="message__raw">
                <summary>"View Raw Results"</summary>
                <pre>{details.raw_results}</pre>
            </details>

            {label.map(|label| view! {
                <button class="btn btn--accent message__more-info" disabled=disabled on:click=on_more_info>
                    {label}
                </button>
            })}

            {details.more_info_error.map(|error| view! {
                <div class="message__inline-error">{error}</div>
            })}

            {details.more_info.map(|info| view! { <MoreInfoPanel info=info/> })}

            {details.additional_results.map(|rows| view! {
                <details class="message__raw">
                    <summary>"View Additional Results"</summary>
                    <pre>{rows}</pre>
                </details>
            })}
        </div>
    }
}

#[component]
fn MoreInfoPanel(info: MoreInfoResult) -> impl IntoView {
    let overall = render_html(&info.overall_summary);
    let codes = code_summaries(&info);

    view! {
        <div class="more-info">
            <div class="more-info__overall">
                <h4>"Overall Summary:"</h4>
                <div class="message__markdown" inner_html=overall></div>
            </div>
            {(!codes.is_empty()).then(|| view! {
                <div class="more-info__codes">
                    <h4>"Concern Code Summaries:"</h4>
                    {codes
                        .into_iter()
                        .map(|(heading, html)| view! {
                            <div class="more-info__code">
                                <h5>{heading}</h5>
                                <div class="message__markdown" inner_html=html></div>
                            </div>
                        })
                        .collect::<Vec<_>>()}
                </div>
            })}
        </div>
    }
}

/// Heading and rendered body for each concern code, in code order.
pub fn code_summaries(info: &MoreInfoResult) -> Vec<(String, String)> {
    info.concern_code_summaries
        .iter()
        .map(|(code, summary)| (format!("Code {code}:"), render_html(summary)))
        .collect()
}

/// Synthetic error answers get the error styling.
pub fn is_error_text(text: &str) -> bool {
    text.starts_with("Error: ")
}
