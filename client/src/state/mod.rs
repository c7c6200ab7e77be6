//! Shared client-side state.
//!
//! DESIGN
//! ======
//! The whole conversation is one `chat::ChatSession` held in an
//! `RwSignal`. `session` wires its begin/settle pairs to spawned network
//! tasks so a query and a drill-down can be in flight at the same time.

pub mod session;
