//! Dialog building blocks for the sales assistant skill.
//!
//! Everything in this crate is free of I/O: slot resolution, keyword
//! accumulation, the typed per-conversation session, opportunity records and
//! update requests, query descriptions handed to a data store, SSML speech and
//! the platform's request/response envelope.

pub mod compose;
pub mod error;
pub mod keywords;
pub mod opportunity;
pub mod query;
pub mod session;
pub mod skill;
pub mod slots;
pub mod speech;
