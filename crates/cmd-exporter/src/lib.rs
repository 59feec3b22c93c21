//! cmd_exporter library entry.
//!
//! Wires the config loader, the collect-on-scrape command collector, and the
//! `/metrics` endpoint. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod collector;
pub mod config;
pub mod ops;
pub mod router;
