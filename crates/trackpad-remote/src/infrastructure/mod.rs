//! Infrastructure layer for the trackpad remote.
//!
//! Contains the I/O adapters: the channel and HTTP transports, the TOML
//! configuration file, and the JSON-lines input reader.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `trackpad_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod input_source;
pub mod storage;
pub mod transport;
