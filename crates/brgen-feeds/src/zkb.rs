//! zKillboard client — public battle-report URLs.
//!
//! zKillboard serves the same page as JSON when asked with `format=json`;
//! the client appends that parameter and hands the body to the payload
//! adapter unchanged.

use std::time::Duration;

use brgen_core::config::ZkbConfig;
use brgen_core::RawBattlePayload;
use serde_json::Value;
use url::Url;

use crate::{redact_query, send_json, BattleReportFetcher, FetchError};

#[derive(Debug, Clone)]
pub struct ZkbClient {
    http: reqwest::Client,
}

impl ZkbClient {
    pub fn new(config: &ZkbConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { http })
    }
}

/// `url` with `format=json` set exactly once.
fn json_url(url: &Url) -> Result<Url, FetchError> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "{url}: only http and https are supported"
        )));
    }
    let mut out = url.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "format")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    out.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("format", "json");
    Ok(out)
}

impl BattleReportFetcher for ZkbClient {
    async fn fetch_report(&self, url: &Url) -> Result<RawBattlePayload, FetchError> {
        let url = json_url(url)?;
        tracing::info!(url = %redact_query(&url), "fetching public battle report");
        let body: Value = send_json(self.http.get(url.clone()), &url).await?;
        Ok(RawBattlePayload::from_value(body)?)
    }
}
