#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

//! `sysbrain` — deterministic LLM reasoning pipeline.
//!
//! Free text on stdin, one bounded call to a local Ollama endpoint, strict
//! contract validation of the reply, an optional append to the SQLite
//! memory log, and exactly one JSON document on stdout.

pub mod config;
pub mod delta;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod schema;

pub use config::{Cli, Config, Mode};
pub use error::{BrainError, Result};
