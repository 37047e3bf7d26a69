//! brgen-feeds — acquisition clients for brgen.
//!
//! Each client fetches a battle from one upstream provider and hands back a
//! [`brgen_core::RawBattlePayload`]. Nothing here normalises; the payload
//! adapter in `brgen-core` absorbs provider-specific field names.
//!
//! - [`esi::EsiClient`] — authenticated EVE Swagger Interface (SSO path)
//! - [`zkb::ZkbClient`] — public zKillboard URLs

pub mod esi;
pub mod zkb;

use std::future::Future;

use brgen_core::{KillmailRef, RawBattlePayload, ReportError};
use thiserror::Error;
use url::Url;

pub use esi::EsiClient;
pub use zkb::ZkbClient;

// ---------------------------------------------------------------------------
// Fetcher traits
// ---------------------------------------------------------------------------

/// Fetches a single killmail with the viewer's SSO credentials.
pub trait KillmailFetcher: Send + Sync {
    fn fetch_killmail(
        &self,
        killmail: &KillmailRef,
        token: &BearerToken,
    ) -> impl Future<Output = Result<RawBattlePayload, FetchError>> + Send;
}

/// Fetches a public battle report by URL.
pub trait BattleReportFetcher: Send + Sync {
    fn fetch_report(
        &self,
        url: &Url,
    ) -> impl Future<Output = Result<RawBattlePayload, FetchError>> + Send;
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// An SSO access token. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Payload(#[from] ReportError),
}

// ---------------------------------------------------------------------------
// Shared request helper
// ---------------------------------------------------------------------------

/// Send `request`, require a 2xx, and decode the body as `T`.
pub(crate) async fn send_json<T>(request: reqwest::RequestBuilder, url: &Url) -> Result<T, FetchError>
where
    T: serde::de::DeserializeOwned,
{
    let shown = redact_query(url);
    let response = request.send().await.map_err(|source| FetchError::Http {
        url: shown.clone(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(url = %shown, status = status.as_u16(), "upstream returned error status");
        return Err(FetchError::Status {
            url: shown,
            status: status.as_u16(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|source| FetchError::Decode { url: shown, source })
}

/// URL without its query string, for logs and error messages.
pub(crate) fn redact_query(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
