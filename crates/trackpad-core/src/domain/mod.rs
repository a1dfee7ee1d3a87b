//! Gesture domain: pure state machines with no I/O.
//!
//! Everything here runs synchronously inside the input handler.  Nothing
//! blocks, nothing is shared across threads, and every piece of state is reset
//! by the end or cancel event of the contacts that created it.

pub mod actions;
pub mod classifier;
pub mod config;
pub mod contact;
pub mod engine;
pub mod input;
pub mod policy;
pub mod raw_stream;
