//! Reusable UI components.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render view models derived from the session signal provided
//! by `app::App`; none of them read the conversation store directly.

pub mod chat_panel;
pub mod message_card;
pub mod suggestion_tiles;
