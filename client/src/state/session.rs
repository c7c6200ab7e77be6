//! Reactive glue between the session signal and the backend.
//!
//! Each action begins a request synchronously (so the user message, the
//! placeholder and the disabled controls render immediately), then spawns
//! the network call and settles the outcome into the signal when it lands.
//! Settling goes through `try_update`, so a result arriving after the app
//! was unmounted is dropped instead of touching a disposed signal.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use chat::{CancelToken, ChatSession, DrillDownError, MessageView, SessionConfig, SubmitError};
use leptos::prelude::*;

use crate::net::api::GlooBackend;

/// Backend handle plus the cancellation switch for everything it spawns.
#[derive(Clone, Debug)]
pub struct ChatRuntime {
    pub backend: GlooBackend,
    pub cancel: CancelToken,
}

impl ChatRuntime {
    pub fn new(config: &SessionConfig) -> Self {
        Self { backend: GlooBackend::new(config), cancel: CancelToken::new() }
    }

    /// Abort in-flight requests and close the session.
    pub fn shutdown(&self, session: RwSignal<ChatSession>) {
        self.cancel.cancel();
        session.try_update(ChatSession::close);
    }
}

/// Submit `input` as a primary query.
///
/// # Errors
///
/// Returns the session's [`SubmitError`]; [`SubmitError::EmptyQuery`] is
/// expected for blank input and should be ignored by callers.
pub fn submit_query(session: RwSignal<ChatSession>, runtime: &ChatRuntime, input: &str) -> Result<(), SubmitError> {
    let ticket = session
        .try_update(|s| s.begin_query(input))
        .unwrap_or(Err(SubmitError::Closed))?;

    #[cfg(feature = "csr")]
    {
        use chat::Backend;

        let runtime = runtime.clone();
        leptos::task::spawn_local(async move {
            let request = ticket.request();
            let outcome = runtime.cancel.run(runtime.backend.process_query(&request)).await;
            let Ok(outcome) = outcome else {
                log::debug!("query {} cancelled", ticket.id());
                return;
            };
            if let Some(Err(e)) = session.try_update(|s| s.settle_query(ticket, outcome)) {
                log::warn!("query result dropped: {e}");
            }
        });
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (ticket, runtime);
    }
    Ok(())
}

/// Submit the text typed into `draft`, clearing it once the session took it.
///
/// # Errors
///
/// Same as [`submit_query`]; on error the draft is left as typed.
pub fn submit_draft(
    session: RwSignal<ChatSession>,
    runtime: &ChatRuntime,
    draft: RwSignal<String>,
) -> Result<(), SubmitError> {
    let text = draft.get_untracked();
    submit_query(session, runtime, &text)?;
    draft.set(String::new());
    Ok(())
}

/// View models for the transcript. Subscribers are only notified when the
/// projection actually changes.
pub fn transcript(session: RwSignal<ChatSession>) -> Memo<Vec<MessageView>> {
    Memo::new(move |_| session.with(ChatSession::view))
}

/// Message count plus both loading flags; changes whenever the transcript
/// grows or a request starts or lands.
pub fn scroll_trigger(session: RwSignal<ChatSession>) -> Memo<(usize, bool, bool)> {
    Memo::new(move |_| session.with(|s| (s.messages().len(), s.is_loading(), s.more_info_loading())))
}

/// Fetch more information for the answer at `index`.
///
/// # Errors
///
/// Returns the session's [`DrillDownError`] when the drill-down cannot start.
pub fn request_more_info(
    session: RwSignal<ChatSession>,
    runtime: &ChatRuntime,
    index: usize,
) -> Result<(), DrillDownError> {
    let (ticket, contract) = session
        .try_update(|s| s.begin_more_info(index).map(|t| (t, s.config().contract)))
        .unwrap_or(Err(DrillDownError::Closed))?;

    #[cfg(feature = "csr")]
    {
        use chat::Backend;

        let runtime = runtime.clone();
        leptos::task::spawn_local(async move {
            let outcome = runtime
                .cancel
                .run(runtime.backend.more_information(ticket.request(), contract))
                .await;
            let Ok(outcome) = outcome else {
                log::debug!("more information {} cancelled", ticket.id());
                return;
            };
            if let Some(Err(e)) = session.try_update(|s| s.settle_more_info(ticket, outcome)) {
                log::warn!("more information result dropped: {e}");
            }
        });
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (ticket, contract, runtime);
    }
    Ok(())
}
