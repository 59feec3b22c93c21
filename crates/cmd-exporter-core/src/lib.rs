//! cmd_exporter core: runtime-free primitives shared by the exporter.
//!
//! This crate owns the error surface, the command-line tokenizer and the
//! child-process executor. It carries no async runtime or HTTP dependencies
//! so the collection contract can be tested in isolation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! A misbehaving command must surface as an `ExecOutcome`, never as a crash
//! of the scrape that ran it.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cmdline;
pub mod error;
pub mod exec;

/// Shared result type.
pub use error::{ExporterError, Result};
