//! Shared session core for the warranty assistant.
//!
//! This crate owns everything both front ends (`client` in the browser and
//! `cli` in the terminal) agree on: the message model, the conversation
//! store, the per-request state machine, the backend wire contract, the
//! dispatchers that drive a query or drill-down end to end, and the
//! rendering contract derived from session state.
//!
//! DESIGN
//! ======
//! The session is sans-IO: `ChatSession::begin_*` hands out a ticket and
//! `ChatSession::settle_*` reconciles an outcome. Front ends that can hold
//! the session across an `.await` use [`dispatch::Dispatcher`]; reactive
//! front ends keep the session in a signal and call begin/settle around
//! their own network task.

pub mod config;
pub mod dispatch;
pub mod markdown;
pub mod message;
pub mod request;
pub mod session;
pub mod store;
pub mod view;
pub mod wire;

pub use config::{ConfigError, DrillDownScope, SessionConfig};
pub use dispatch::{Backend, CancelToken, Cancelled, DispatchError, Dispatcher};
pub use message::{Message, MoreInfoResult, ResultDetails, VECTOR_SEARCH};
pub use request::{RequestId, RequestKind, RequestState};
pub use session::{ChatSession, DrillDownError, MoreInfoTicket, QueryTicket, SettleError, SubmitError};
pub use store::{ConversationStore, StoreError};
pub use view::{DetailsView, DrillDownControl, MessageView};
pub use wire::{ApiError, BackendContract, MoreInfoRequest, MoreInfoResponse, QueryRequest, QueryResponse};
