//! Suggested prompts shown on an empty transcript.

use leptos::prelude::*;

/// One tile per suggestion; picking a tile submits its text as typed input.
#[component]
pub fn SuggestionTiles(suggestions: Vec<String>, on_pick: Callback<String>) -> impl IntoView {
    view! {
        <div class="suggestions">
            {suggestions
                .into_iter()
                .map(|prompt| {
                    let text = prompt.clone();
                    view! {
                        <button class="suggestions__tile" type="button" on:click=move |_| on_pick.run(text.clone())>
                            {prompt}
                        </button>
                    }
                })
                .collect::<Vec<_>>()}
        </div>
    }
}
