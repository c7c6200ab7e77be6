//! Chat session: conversation store plus the two request flows.
//!
//! DESIGN
//! ======
//! Each flow is split into `begin_*` (validate, mutate the store, hand out
//! a ticket) and `settle_*` (reconcile an outcome). The network call sits
//! between the two and is owned by the caller, which keeps this type free
//! of any runtime or transport.
//!
//! Ordering: `begin_query` is the only operation that appends, and it is
//! refused while a query is pending, so the placeholder it adds is still
//! the last message when its ticket settles.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tracing::{debug, info, warn};

use crate::config::{DrillDownScope, SessionConfig};
use crate::message::{Message, ResultDetails};
use crate::request::{RequestId, RequestKind, RequestState, RequestTracker};
use crate::store::{ConversationStore, StoreError};
use crate::wire::{ApiError, MoreInfoRequest, MoreInfoResponse, QueryRequest, QueryResponse};

/// Why a query was not started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// Input was empty after trimming. Front ends ignore this silently.
    #[error("query is empty")]
    EmptyQuery,
    #[error("a query is already in progress")]
    Busy,
    #[error("session is closed")]
    Closed,
}

/// Why a drill-down was not started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrillDownError {
    #[error("no message at position {0}")]
    NoSuchMessage(usize),
    #[error("message {0} is not eligible for more information")]
    NotEligible(usize),
    #[error("a more-information request is already in progress")]
    Busy,
    #[error("session is closed")]
    Closed,
}

/// Why an outcome could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettleError {
    /// The ticket does not belong to the pending request.
    #[error("ticket {0} is stale")]
    Stale(RequestId),
    /// The session was closed while the request was in flight.
    #[error("session is closed")]
    Closed,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Handle for an in-flight primary query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    id: RequestId,
    query: String,
}

impl QueryTicket {
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn request(&self) -> QueryRequest {
        QueryRequest { query: self.query.clone() }
    }
}

/// Handle for an in-flight drill-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoreInfoTicket {
    id: RequestId,
    target: usize,
    request: MoreInfoRequest,
}

impl MoreInfoTicket {
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Position of the message whose control triggered the drill-down.
    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    #[must_use]
    pub fn request(&self) -> &MoreInfoRequest {
        &self.request
    }
}

#[derive(Clone, Debug, Default)]
pub struct ChatSession {
    config: SessionConfig,
    store: ConversationStore,
    requests: RequestTracker,
    closed: bool,
}

impl ChatSession {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self { config, ..Self::default() }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.store.as_slice()
    }

    #[must_use]
    pub fn request_state(&self, kind: RequestKind) -> &RequestState {
        self.requests.state(kind)
    }

    /// Whether a primary query is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.requests.is_pending(RequestKind::Query)
    }

    /// Whether a drill-down is in flight.
    #[must_use]
    pub fn more_info_loading(&self) -> bool {
        self.requests.is_pending(RequestKind::MoreInfo)
    }

    /// Whether the submit control should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.closed && !self.is_loading()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // =========================================================================
    // PRIMARY QUERY
    // =========================================================================

    /// Start a primary query: record the user message and a placeholder and
    /// mark the query pending.
    ///
    /// # Errors
    ///
    /// [`SubmitError::EmptyQuery`] for blank input (no state change),
    /// [`SubmitError::Busy`] while another query is pending and
    /// [`SubmitError::Closed`] after [`ChatSession::close`].
    pub fn begin_query(&mut self, input: &str) -> Result<QueryTicket, SubmitError> {
        if self.closed {
            return Err(SubmitError::Closed);
        }
        let query = input.trim();
        if query.is_empty() {
            return Err(SubmitError::EmptyQuery);
        }
        if self.is_loading() || self.store.has_placeholder() {
            return Err(SubmitError::Busy);
        }

        let id = self.requests.start(RequestKind::Query).map_err(|_| SubmitError::Busy)?;
        // Both appends are infallible here: no placeholder is present.
        self.store
            .append(Message::user(query))
            .and_then(|_| self.store.append(Message::Loading))
            .map_err(|_| SubmitError::Busy)?;

        info!(request = %id, query_len = query.len(), "query started");
        Ok(QueryTicket { id, query: query.to_owned() })
    }

    /// Reconcile a primary query outcome, replacing the placeholder with the
    /// answer or with a synthetic error message. Returns the answer's position.
    ///
    /// # Errors
    ///
    /// [`SettleError::Closed`] if the session was closed meanwhile,
    /// [`SettleError::Stale`] for a ticket that is not the pending query.
    /// Neither mutates the session.
    pub fn settle_query(
        &mut self,
        ticket: QueryTicket,
        outcome: Result<QueryResponse, ApiError>,
    ) -> Result<usize, SettleError> {
        if self.closed {
            return Err(SettleError::Closed);
        }
        self.requests
            .check(RequestKind::Query, ticket.id)
            .map_err(|_| SettleError::Stale(ticket.id))?;

        let answer = outcome.and_then(|resp| resp.into_answer(self.config.contract));
        let (message, state) = match answer {
            Ok((text, details)) => {
                debug!(
                    request = %ticket.id,
                    search_method = %details.search_method,
                    codes = details.codes.len(),
                    "query answered"
                );
                (Message::bot(text, Some(details)), Ok(()))
            }
            Err(e) => {
                warn!(request = %ticket.id, error = %e, "query failed");
                (Message::query_error(&e.to_string()), Err(e.to_string()))
            }
        };

        let index = self.store.replace_last(message)?;
        self.settle_request(RequestKind::Query, ticket.id, state);
        Ok(index)
    }

    // =========================================================================
    // DRILL-DOWN
    // =========================================================================

    /// Whether the drill-down control for message `index` is shown.
    #[must_use]
    pub fn offers_more_info(&self, index: usize) -> bool {
        self.store.details(index).is_some_and(|d| d.is_drill_down_eligible())
    }

    /// Start a drill-down for the answer at `index`.
    ///
    /// No placeholder is appended; only the more-info request state changes.
    ///
    /// # Errors
    ///
    /// See [`DrillDownError`].
    pub fn begin_more_info(&mut self, index: usize) -> Result<MoreInfoTicket, DrillDownError> {
        if self.closed {
            return Err(DrillDownError::Closed);
        }
        let message = self.store.get(index).ok_or(DrillDownError::NoSuchMessage(index))?;
        let details = message
            .details()
            .filter(|d| d.is_drill_down_eligible())
            .ok_or(DrillDownError::NotEligible(index))?;
        let request = MoreInfoRequest { table_name: details.table_used.clone(), codes: details.codes.clone() };

        let id = self
            .requests
            .start(RequestKind::MoreInfo)
            .map_err(|_| DrillDownError::Busy)?;

        info!(request = %id, target = index, codes = request.codes.len(), "more information started");
        Ok(MoreInfoTicket { id, target: index, request })
    }

    /// Reconcile a drill-down outcome. Returns how many messages received the
    /// result; on failure the triggering message carries an inline error and
    /// `0` is returned.
    ///
    /// # Errors
    ///
    /// [`SettleError::Closed`] or [`SettleError::Stale`], without mutation.
    pub fn settle_more_info(
        &mut self,
        ticket: MoreInfoTicket,
        outcome: Result<MoreInfoResponse, ApiError>,
    ) -> Result<usize, SettleError> {
        if self.closed {
            return Err(SettleError::Closed);
        }
        self.requests
            .check(RequestKind::MoreInfo, ticket.id)
            .map_err(|_| SettleError::Stale(ticket.id))?;

        match outcome.and_then(MoreInfoResponse::into_result) {
            Ok(result) => {
                let target = ticket.target;
                let write = |d: &mut ResultDetails| {
                    d.more_info = Some(result.clone());
                    d.more_info_error = None;
                };
                let updated = match self.config.drill_down_scope {
                    DrillDownScope::AllEligible => self.store.update_where(|_, d| d.is_drill_down_eligible(), write),
                    DrillDownScope::Triggering => {
                        self.store.update_where(|i, d| i == target && d.is_drill_down_eligible(), write)
                    }
                };
                info!(request = %ticket.id, updated, "more information applied");
                self.settle_request(RequestKind::MoreInfo, ticket.id, Ok(()));
                Ok(updated)
            }
            Err(e) => {
                warn!(request = %ticket.id, target = ticket.target, error = %e, "more information failed");
                if let Some(details) = self.store.details_mut(ticket.target) {
                    details.more_info_error = Some(format!("Error fetching more information: {e}. Please try again."));
                }
                self.settle_request(RequestKind::MoreInfo, ticket.id, Err(e.to_string()));
                Ok(0)
            }
        }
    }

    // =========================================================================
    // TEARDOWN
    // =========================================================================

    /// Close the session: pending requests fail, an outstanding placeholder is
    /// removed, and later submissions or settlements are refused.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.requests.abandon("session closed");
        if self.store.discard_placeholder() {
            debug!("discarded pending placeholder on close");
        }
        info!(messages = self.store.len(), "session closed");
    }

    fn settle_request(&mut self, kind: RequestKind, id: RequestId, outcome: Result<(), String>) {
        if let Err(e) = self.requests.settle(kind, id, outcome) {
            warn!(request = %id, error = %e, "request state out of sync");
        }
    }
}
