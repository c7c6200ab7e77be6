//! Chat panel: transcript, suggestion tiles and the query input.
//!
//! SYSTEM CONTEXT
//! ==============
//! Paints the transcript from the session signal and hands user intent to
//! `state::session`, which owns the network side. The typed text lives in a
//! local signal so keystrokes never touch the session.

use chat::{ChatSession, SubmitError};
use leptos::prelude::*;

use crate::components::message_card::MessageCard;
use crate::components::suggestion_tiles::SuggestionTiles;
use crate::state::session::{ChatRuntime, scroll_trigger, submit_draft, submit_query, transcript};

pub const INPUT_PLACEHOLDER: &str = "Ask about warranty information...";

/// Chat panel showing conversation history and a query input.
#[component]
pub fn ChatPanel() -> impl IntoView {
    let session = expect_context::<RwSignal<ChatSession>>();
    let runtime = expect_context::<ChatRuntime>();
    let draft = RwSignal::new(String::new());
    let transcript = transcript(session);
    let scroll = scroll_trigger(session);

    let messages_ref = NodeRef::<leptos::html::Div>::new();

    Effect::new(move || {
        scroll.track();

        #[cfg(feature = "csr")]
        {
            if let Some(el) = messages_ref.get() {
                let scroll_height = el.scroll_height();
                el.set_scroll_top(scroll_height);
            }
        }
    });

    let pick_runtime = runtime.clone();
    let pick = Callback::new(move |text: String| report_submit(submit_query(session, &pick_runtime, &text)));

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        report_submit(submit_draft(session, &runtime, draft));
    };

    let can_submit = Memo::new(move |_| session.with(ChatSession::can_submit));
    let loading = Memo::new(move |_| session.with(ChatSession::is_loading));
    let can_send = move || can_submit.get() && draft.with(|d| !d.trim().is_empty());

    view! {
        <div class="chat-panel">
            <div class="chat-panel__messages" node_ref=messages_ref>
                {move || {
                    let views = transcript.get();
                    if views.is_empty() {
                        let suggestions = session.with_untracked(|s| s.config().suggestions.clone());
                        return view! {
                            <div class="chat-panel__empty">
                                <p>"Ask a question about warranty claims, or start from a suggestion."</p>
                                <SuggestionTiles suggestions=suggestions on_pick=pick/>
                            </div>
                        }
                            .into_any();
                    }

                    views
                        .into_iter()
                        .map(|message| view! { <MessageCard message=message/> })
                        .collect::<Vec<_>>()
                        .into_any()
                }}
            </div>

            <form class="chat-panel__input-row" on:submit=on_submit>
                <input
                    class="chat-panel__input"
                    type="text"
                    placeholder=INPUT_PLACEHOLDER
                    prop:value=move || draft.get()
                    on:input=move |ev| draft.set(event_target_value(&ev))
                />
                <button class="btn btn--primary chat-panel__send" type="submit" disabled=move || !can_send()>
                    {move || if loading.get() { "Sending..." } else { "Send" }}
                </button>
            </form>
        </div>
    }
}

fn report_submit(result: Result<(), SubmitError>) {
    match result {
        Ok(()) | Err(SubmitError::EmptyQuery) => {}
        Err(e) => log::debug!("submit refused: {e}"),
    }
}
