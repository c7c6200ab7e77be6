//! Dispatchers: drive a query or drill-down from submission to settlement.
//!
//! DESIGN
//! ======
//! [`Backend`] is the transport seam: `cli` implements it over `reqwest`,
//! `client` over `gloo-net`, tests with a scripted mock. Timeouts belong to
//! the transport; the dispatcher only sees the resulting [`ApiError`].
//!
//! [`CancelToken`] aborts every in-flight call it has wrapped. A cancelled
//! dispatch closes the session so nothing lands in a torn-down view.

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod dispatch_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{AbortHandle, Abortable};
use tracing::{debug, info};

use crate::session::{ChatSession, DrillDownError, SettleError, SubmitError};
use crate::wire::{ApiError, BackendContract, MoreInfoRequest, MoreInfoResponse, QueryRequest, QueryResponse};

// =============================================================================
// BACKEND
// =============================================================================

/// Transport for the two backend endpoints.
///
/// Futures are not required to be `Send` so browser transports qualify.
#[async_trait::async_trait(?Send)]
pub trait Backend {
    /// `POST /api/process-query`.
    async fn process_query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError>;

    /// `POST /api/more-information`, with the codes field named per `contract`.
    async fn more_information(
        &self,
        request: &MoreInfoRequest,
        contract: BackendContract,
    ) -> Result<MoreInfoResponse, ApiError>;
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// The wrapped future was aborted by [`CancelToken::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request cancelled")]
pub struct Cancelled;

#[derive(Debug, Default)]
struct CancelState {
    cancelled: bool,
    next_key: u64,
    handles: Vec<(u64, AbortHandle)>,
}

/// Shared cancellation switch. Clones observe the same state.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<Mutex<CancelState>>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort every future currently running under this token, and refuse new ones.
    pub fn cancel(&self) {
        let handles = {
            let mut state = self.lock();
            state.cancelled = true;
            std::mem::take(&mut state.handles)
        };
        debug!(aborted = handles.len(), "cancel token fired");
        for (_, handle) in handles {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Run `fut` to completion unless the token fires first.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if the token fired before or during the run.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Cancelled> {
        let (handle, registration) = AbortHandle::new_pair();
        let key = {
            let mut state = self.lock();
            if state.cancelled {
                return Err(Cancelled);
            }
            let key = state.next_key;
            state.next_key += 1;
            state.handles.push((key, handle));
            key
        };

        let result = Abortable::new(fut, registration).await;
        self.lock().handles.retain(|(k, _)| *k != key);
        result.map_err(|_| Cancelled)
    }

    fn lock(&self) -> MutexGuard<'_, CancelState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// DISPATCHER
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    DrillDown(#[from] DrillDownError),
    #[error(transparent)]
    Settle(#[from] SettleError),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// Runs requests against a [`Backend`] for a session it borrows per call.
///
/// Each call holds the session mutably across the backend await, so one
/// dispatcher serves callers that issue requests one at a time. Reactive
/// front ends that need a query and a drill-down to overlap call the
/// session's begin/settle pair around their own tasks instead.
pub struct Dispatcher<B> {
    backend: B,
    cancel: CancelToken,
}

impl<B: Backend> Dispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self::with_cancel(backend, CancelToken::new())
    }

    pub fn with_cancel(backend: B, cancel: CancelToken) -> Self {
        Self { backend, cancel }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// A handle that cancels this dispatcher's in-flight requests.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Submit `input` as a query and wait for the answer. Returns the
    /// position of the bot message that replaced the placeholder, which is an
    /// error message when the backend call failed.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Submit`] when the session refused the query, and
    /// [`DispatchError::Cancelled`] when the token fired; the session is
    /// closed in that case.
    pub async fn submit(&self, session: &mut ChatSession, input: &str) -> Result<usize, DispatchError> {
        if self.cancel.is_cancelled() {
            session.close();
            return Err(Cancelled.into());
        }
        let ticket = session.begin_query(input)?;
        let request = ticket.request();

        let outcome = self.cancel.run(self.backend.process_query(&request)).await;
        match outcome {
            Ok(outcome) => Ok(session.settle_query(ticket, outcome)?),
            Err(cancelled) => {
                info!(request = %ticket.id(), "query cancelled");
                session.close();
                Err(cancelled.into())
            }
        }
    }

    /// Fetch more information for the answer at `index`. Returns how many
    /// messages received the result (zero on failure, with an inline error
    /// on the target).
    ///
    /// # Errors
    ///
    /// [`DispatchError::DrillDown`] when the session refused the drill-down,
    /// and [`DispatchError::Cancelled`] as for [`Dispatcher::submit`].
    pub async fn request_more_info(&self, session: &mut ChatSession, index: usize) -> Result<usize, DispatchError> {
        if self.cancel.is_cancelled() {
            session.close();
            return Err(Cancelled.into());
        }
        let ticket = session.begin_more_info(index)?;
        let contract = session.config().contract;

        let outcome = self.cancel.run(self.backend.more_information(ticket.request(), contract)).await;
        match outcome {
            Ok(outcome) => Ok(session.settle_more_info(ticket, outcome)?),
            Err(cancelled) => {
                info!(request = %ticket.id(), "more information cancelled");
                session.close();
                Err(cancelled.into())
            }
        }
    }
}
