//! Error types for report normalisation and persistence.

use thiserror::Error;

/// Failures raised while turning a request or raw payload into a report.
///
/// None of these are retried; each is fatal to the single report request
/// that raised it.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The raw payload is not a JSON object (null, array, or scalar).
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The acquisition-path discriminator is outside the known set.
    #[error("unsupported data source type: {0:?}")]
    UnsupportedSource(String),

    /// A request is missing a field its source requires, or manual input is
    /// malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Failures raised by a [`ReportSink`](crate::store::ReportSink).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store record is not valid JSON (line {line}): {source}")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}
