//! Root application component with context providers.

use chat::{ChatSession, SessionConfig};
use leptos::prelude::*;
use leptos_meta::{Stylesheet, Title, provide_meta_context};

use crate::components::chat_panel::ChatPanel;
use crate::state::session::ChatRuntime;

/// Root application component.
///
/// Provides the session signal and the runtime that drives it, and tears
/// both down when the app is unmounted.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = SessionConfig::default().with_base_url(page_base_url());
    let runtime = ChatRuntime::new(&config);
    let session = RwSignal::new(ChatSession::new(config));

    provide_context(session);
    provide_context(runtime.clone());

    on_cleanup(move || runtime.shutdown(session));

    view! {
        <Stylesheet id="leptos" href="/pkg/warranty-bot.css"/>
        <Title text="Warranty Bot"/>

        <div class="app">
            <header class="app__header">
                <h1 class="app__title">"Warranty Bot"</h1>
            </header>
            <main class="app__main">
                <ChatPanel/>
            </main>
        </div>
    }
}

/// Backend origin from `<meta name="warranty-api-url">`, or same origin.
fn page_base_url() -> String {
    #[cfg(feature = "csr")]
    {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|doc| doc.query_selector("meta[name=\"warranty-api-url\"]").ok().flatten())
            .and_then(|el| el.get_attribute("content"))
            .unwrap_or_default()
    }
    #[cfg(not(feature = "csr"))]
    {
        String::new()
    }
}
