//! brgen — battle report generator
//!
//! Turns EVE Online battle data into friendly-vs-enemy reports. This crate
//! re-exports the two library crates so that integration tests and the CLI
//! can import everything from one place, and adds the [`generator`] that
//! ties acquisition, normalisation, and persistence together.
//!
//! # Architecture
//!
//! ```text
//! ESI (SSO) ──┐
//! zKillboard ─┼──► RawBattlePayload ──► normalize ──► CanonicalReport ──► ReportSink
//! manual ─────┘
//! ```
//!
//! Only the fetchers do I/O; normalisation is a pure function of the payload
//! and an injected clock.

pub mod generator;

pub use brgen_core as core;
pub use brgen_feeds as feeds;

pub use generator::{GenerateError, ReportGenerator, Session};
