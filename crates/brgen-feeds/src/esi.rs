//! ESI client — authenticated killmail access for the SSO path.
//!
//! Endpoints used:
//! - `GET {base}/killmails/{id}/{hash}/` (or `/killmails/{id}/` without a hash)
//! - `GET {base}/characters/{character_id}/killmails/recent/`
//!
//! Every request carries `Authorization: Bearer …` and the configured
//! `datasource` query parameter.

use std::time::Duration;

use brgen_core::config::EsiConfig;
use brgen_core::{KillmailRef, RawBattlePayload};
use serde_json::Value;
use url::Url;

use crate::{send_json, BearerToken, FetchError, KillmailFetcher};

#[derive(Debug, Clone)]
pub struct EsiClient {
    http: reqwest::Client,
    base_url: String,
    datasource: String,
}

impl EsiClient {
    pub fn new(config: &EsiConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Client)?;
        Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            datasource: config.datasource.clone(),
        })
    }

    /// Killmail references the character was recently involved in.
    pub async fn recent_killmails(
        &self,
        character_id: u64,
        token: &BearerToken,
    ) -> Result<Vec<KillmailRef>, FetchError> {
        let url = self.endpoint(&format!("/characters/{character_id}/killmails/recent/"))?;
        tracing::info!(character_id, "fetching recent killmails from ESI");
        let refs: Vec<KillmailRef> =
            send_json(self.http.get(url.clone()).bearer_auth(token.expose()), &url).await?;
        tracing::debug!(character_id, count = refs.len(), "recent killmails fetched");
        Ok(refs)
    }

    fn killmail_url(&self, killmail: &KillmailRef) -> Result<Url, FetchError> {
        match &killmail.hash {
            Some(hash) => self.endpoint(&format!("/killmails/{}/{}/", killmail.id, hash)),
            None => self.endpoint(&format!("/killmails/{}/", killmail.id)),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;
        url.query_pairs_mut().append_pair("datasource", &self.datasource);
        Ok(url)
    }
}

impl KillmailFetcher for EsiClient {
    async fn fetch_killmail(
        &self,
        killmail: &KillmailRef,
        token: &BearerToken,
    ) -> Result<RawBattlePayload, FetchError> {
        let url = self.killmail_url(killmail)?;
        tracing::info!(killmail_id = killmail.id, "fetching killmail from ESI");
        let body: Value =
            send_json(self.http.get(url.clone()).bearer_auth(token.expose()), &url).await?;
        Ok(RawBattlePayload::from_value(body)?)
    }
}
