//! Networking for the browser client.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` implements the session's `Backend` trait over `gloo-net`. Wire
//! shapes live in `chat::wire` and are shared with the terminal client.

pub mod api;
