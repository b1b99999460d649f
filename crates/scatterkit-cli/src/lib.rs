//! scatterkit CLI library.
//!
//! Job and graph file loading, the JSON preferences store, and the
//! command implementations behind the `scatterkit` binary.

pub mod commands;
pub mod input;
