//! Domain types for the remote: what comes in and what we know about the link.
//!
//! Nothing here performs I/O.  The input-line protocol is plain serde data,
//! and [`ConnectivityHealth`] is a value published by the transports and read
//! by whoever renders the status indicator.

pub mod health;
pub mod input_line;
pub mod mode;

pub use health::ConnectivityHealth;
pub use input_line::InputLine;
pub use mode::InputMode;
