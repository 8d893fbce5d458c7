//! Pipeline tests.
//!
//! `support` holds scripted stand-ins for the chat service, the evidence
//! store, and the web search provider; `scenarios` walks full runs
//! through the state machine and asserts on the calls each stage made.

pub(crate) mod support;
