//! Per-request lifecycle state.
//!
//! Each request kind moves through `Idle -> Pending -> Succeeded | Failed`
//! and back to `Pending` on the next start. A kind can only have one
//! request pending; settlement must present the id handed out at start.

#[cfg(test)]
#[path = "request_test.rs"]
mod request_test;

use std::fmt;

/// The two independent request channels of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// First-level `process-query` call.
    Query,
    /// Drill-down `more-information` call.
    MoreInfo,
}

/// Identifier handed out when a request starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Pending {
        id: RequestId,
    },
    Succeeded,
    Failed {
        reason: String,
    },
}

impl RequestState {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    fn pending_id(&self) -> Option<RequestId> {
        match self {
            Self::Pending { id } => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("a {0:?} request is already pending")]
    AlreadyPending(RequestKind),
    #[error("request {0} is not the pending {1:?} request")]
    Stale(RequestId, RequestKind),
}

/// Tracks the state of both request kinds for one session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestTracker {
    query: RequestState,
    more_info: RequestState,
    next_id: u64,
}

impl RequestTracker {
    #[must_use]
    pub fn state(&self, kind: RequestKind) -> &RequestState {
        match kind {
            RequestKind::Query => &self.query,
            RequestKind::MoreInfo => &self.more_info,
        }
    }

    #[must_use]
    pub fn is_pending(&self, kind: RequestKind) -> bool {
        self.state(kind).is_pending()
    }

    /// Move `kind` to `Pending` under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::AlreadyPending`] if `kind` is already pending.
    pub fn start(&mut self, kind: RequestKind) -> Result<RequestId, RequestError> {
        if self.is_pending(kind) {
            return Err(RequestError::AlreadyPending(kind));
        }
        self.next_id += 1;
        let id = RequestId(self.next_id);
        *self.slot(kind) = RequestState::Pending { id };
        Ok(id)
    }

    /// Check that `id` is the pending request for `kind` without settling it.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Stale`] when `id` is not the pending request.
    pub fn check(&self, kind: RequestKind, id: RequestId) -> Result<(), RequestError> {
        if self.state(kind).pending_id() == Some(id) {
            Ok(())
        } else {
            Err(RequestError::Stale(id, kind))
        }
    }

    /// Settle the pending request `id` as succeeded or failed.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Stale`] when `id` is not the pending request;
    /// the tracked state is left unchanged.
    pub fn settle(&mut self, kind: RequestKind, id: RequestId, outcome: Result<(), String>) -> Result<(), RequestError> {
        self.check(kind, id)?;
        *self.slot(kind) = match outcome {
            Ok(()) => RequestState::Succeeded,
            Err(reason) => RequestState::Failed { reason },
        };
        Ok(())
    }

    /// Fail every pending request with `reason`. Used when the session closes.
    pub fn abandon(&mut self, reason: &str) {
        for kind in [RequestKind::Query, RequestKind::MoreInfo] {
            let slot = self.slot(kind);
            if slot.is_pending() {
                *slot = RequestState::Failed { reason: reason.to_owned() };
            }
        }
    }

    fn slot(&mut self, kind: RequestKind) -> &mut RequestState {
        match kind {
            RequestKind::Query => &mut self.query,
            RequestKind::MoreInfo => &mut self.more_info,
        }
    }
}
