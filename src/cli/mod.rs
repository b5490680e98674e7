//! CLI module
//!
//! The binary does one thing: run the ingestion job into the chosen sink.

mod commands;
mod runner;

pub use commands::{Cli, SinkKind};
pub use runner::Runner;
