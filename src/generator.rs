//! Report generator — dispatches a [`DataSource`] to the right acquisition
//! path, normalises the payload, attributes it, and persists it.
//!
//! | Path | Needs session | Viewer passed to normalizer | `createdBy` |
//! |------|---------------|-----------------------------|-------------|
//! | SSO killmail | yes (with token) | session character | session character |
//! | public URL | no | none | session character, if any |
//! | manual | no | none | session character, if any |

use brgen_core::{
    normalize, CanonicalReport, Clock, DataSource, Identity, RawBattlePayload, ReportError,
    ReportRequest, ReportSink, ReportSummary, SourceKind, StoreError, StoredReport, SystemClock,
};
use brgen_feeds::{BattleReportFetcher, BearerToken, FetchError, KillmailFetcher};
use thiserror::Error;

/// The logged-in character a request is made on behalf of.
#[derive(Debug, Clone)]
pub struct Session {
    pub character: Identity,
    /// Required for the SSO path only.
    pub token: Option<BearerToken>,
}

impl Session {
    pub fn new(character: impl Into<Identity>, token: BearerToken) -> Self {
        Self {
            character: character.into(),
            token: Some(token),
        }
    }

    /// A session that identifies the viewer but cannot call ESI.
    pub fn without_token(character: impl Into<Identity>) -> Self {
        Self {
            character: character.into(),
            token: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("the {0} data source requires an authenticated session")]
    Unauthenticated(SourceKind),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct ReportGenerator<K, P, S> {
    killmails: K,
    public: P,
    sink: S,
    clock: Box<dyn Clock>,
}

impl<K, P, S> ReportGenerator<K, P, S>
where
    K: KillmailFetcher,
    P: BattleReportFetcher,
    S: ReportSink,
{
    pub fn new(killmails: K, public: P, sink: S) -> Self {
        Self {
            killmails,
            public,
            sink,
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the clock used for default battle times.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Acquire and normalise without persisting.
    pub async fn build_report(
        &self,
        source: DataSource,
        session: Option<&Session>,
    ) -> Result<CanonicalReport, GenerateError> {
        let kind = source.kind();
        let (raw, viewer): (RawBattlePayload, Option<&Identity>) = match source {
            DataSource::SsoKillmail { killmail } => {
                let (session, token) = session
                    .and_then(|s| s.token.as_ref().map(|t| (s, t)))
                    .ok_or(GenerateError::Unauthenticated(kind))?;
                let raw = self.killmails.fetch_killmail(&killmail, token).await?;
                (raw, Some(&session.character))
            }
            DataSource::PublicUrl { url } => (self.public.fetch_report(&url).await?, None),
            DataSource::Manual(details) => (details.into_payload()?, None),
        };

        let created_by = session.map(|s| s.character.clone());
        Ok(normalize(&raw, viewer, self.clock.now()).with_created_by(created_by))
    }

    /// Acquire, normalise, and persist one report.
    ///
    /// Failures are logged here and returned; nothing is retried.
    pub async fn generate(
        &self,
        source: DataSource,
        session: Option<&Session>,
    ) -> Result<StoredReport, GenerateError> {
        let kind = source.kind();
        let result = match self.build_report(source, session).await {
            Ok(report) => self.sink.insert(report).map_err(GenerateError::from),
            Err(e) => Err(e),
        };
        match &result {
            Ok(stored) => tracing::info!(source = %kind, id = stored.id, "report generated"),
            Err(e) => tracing::error!(source = %kind, error = %e, "report generation failed"),
        }
        result
    }

    /// [`generate`](Self::generate) from a flat request record.
    pub async fn generate_from_request(
        &self,
        request: ReportRequest,
        session: Option<&Session>,
    ) -> Result<StoredReport, GenerateError> {
        let source = DataSource::try_from(request).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected report request");
        })?;
        self.generate(source, session).await
    }

    /// Stored report summaries, newest first.
    pub fn list_public(&self) -> Result<Vec<ReportSummary>, GenerateError> {
        Ok(self.sink.list()?)
    }
}
