//! brgen-core — battle report generator core library.
//!
//! This crate owns everything that does not touch the network: the raw
//! payload adapter, the normalizer, the acquisition-path variants, the
//! manual input adapter, and the persistence sinks.
//!
//! # Architecture
//!
//! ```text
//! DataSource ──► (fetch / manual adapter) ──► RawBattlePayload
//!                                                  │
//!                                              normalize
//!                                                  │
//!                                                  ▼
//!                              CanonicalReport ──► ReportSink
//! ```
//!
//! Fetching lives in `brgen-feeds`; the root `brgen` crate wires the pieces
//! together.

pub mod clock;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod payload;
pub mod source;
pub mod store;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ReportError, StoreError};
pub use normalizer::{normalize, normalize_value};
pub use payload::{RawBattlePayload, RawParticipant};
pub use source::{DataSource, KillmailRef, ManualDetails, ManualParticipant, ReportRequest, SourceKind};
pub use store::{JsonlStore, MemoryStore, ReportSink, ReportSummary, StoredReport};
pub use types::{CanonicalReport, Identity, Participant, ShipGroup, Side, SideSummary};
