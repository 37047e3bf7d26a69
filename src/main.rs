use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use brgen::{ReportGenerator, Session};
use brgen_core::config::Config;
use brgen_core::{
    normalize_value, DataSource, Identity, JsonlStore, KillmailRef, ManualDetails,
    ManualParticipant, ReportSink,
};
use brgen_feeds::{BearerToken, EsiClient, ZkbClient};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "brgen", about = "Battle report generator — EVE Online killmails to friendly-vs-enemy reports")]
struct Cli {
    /// Write debug logs to $TMPDIR/brgen-debug.log (tail -f to inspect).
    #[arg(long, global = true)]
    debug: bool,

    /// Report store file. Defaults to the configured `[store] path`.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalise a raw payload (file or stdin) and print the report. Nothing is stored.
    Normalize {
        /// JSON payload file. Reads stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Viewer identity, as the SSO path would pass it.
        #[arg(long)]
        viewer: Option<Identity>,
        /// Instant used when the payload has no battle time (RFC 3339).
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Fetch one killmail from ESI with an SSO token and store the report.
    Killmail {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        hash: Option<String>,
        #[arg(long)]
        character: u64,
        #[arg(long)]
        token: String,
    },
    /// Fetch a public zKillboard battle report and store it.
    Zkb {
        #[arg(long)]
        url: String,
        /// Attribute the report to this character.
        #[arg(long)]
        character: Option<u64>,
    },
    /// Build a report from manually entered details and store it.
    Manual {
        #[arg(long)]
        system: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM (UTC)
        #[arg(long)]
        time: String,
        #[arg(long)]
        title: Option<String>,
        /// JSON array of {ship_type, value, pilot_name}.
        #[arg(long)]
        attackers: Option<PathBuf>,
        /// JSON array of {ship_type, value, pilot_name}.
        #[arg(long)]
        defenders: Option<PathBuf>,
        /// Key event line; repeat for several.
        #[arg(long = "event")]
        events: Vec<String>,
        #[arg(long)]
        character: Option<u64>,
    },
    /// List killmails the character was recently involved in.
    Recent {
        #[arg(long)]
        character: u64,
        #[arg(long)]
        token: String,
    },
    /// List stored reports, newest first.
    List,
    /// Print one stored report.
    Show { id: u64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    match cli.command {
        Command::Normalize { input, viewer, now } => {
            let text = match input {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let value: serde_json::Value =
                serde_json::from_str(&text).context("payload is not valid JSON")?;
            let report = normalize_value(value, viewer.as_ref(), now.unwrap_or_else(Utc::now))
                .context("report generation failed")?;
            print_json(&report)
        }
        Command::Recent { character, token } => {
            let config = Config::load()?;
            let esi = EsiClient::new(&config.esi)?;
            let refs = esi
                .recent_killmails(character, &BearerToken::new(token))
                .await
                .context("fetching recent killmails failed")?;
            print_json(&refs)
        }
        Command::List => {
            let store = open_store(cli.store.as_deref())?;
            print_json(&store.list()?)
        }
        Command::Show { id } => {
            let store = open_store(cli.store.as_deref())?;
            let stored = store
                .get(id)?
                .with_context(|| format!("no report with id {id}"))?;
            print_json(&stored)
        }
        command => {
            let config = Config::load()?;
            let store = match cli.store {
                Some(path) => JsonlStore::open(path)?,
                None => JsonlStore::open(config.store.resolved_path())?,
            };
            let generator = ReportGenerator::new(
                EsiClient::new(&config.esi)?,
                ZkbClient::new(&config.zkb)?,
                store,
            );
            let (source, session) = acquisition(command)?;
            let stored = generator
                .generate(source, session.as_ref())
                .await
                .context("report generation failed")?;
            print_json(&stored)
        }
    }
}

/// Map a generating subcommand to its data source and session.
fn acquisition(command: Command) -> anyhow::Result<(DataSource, Option<Session>)> {
    Ok(match command {
        Command::Killmail { id, hash, character, token } => (
            DataSource::SsoKillmail {
                killmail: KillmailRef { id, hash },
            },
            Some(Session::new(character, BearerToken::new(token))),
        ),
        Command::Zkb { url, character } => (
            DataSource::public_url(&url)?,
            character.map(Session::without_token),
        ),
        Command::Manual {
            system,
            date,
            time,
            title,
            attackers,
            defenders,
            events,
            character,
        } => (
            DataSource::Manual(ManualDetails {
                title,
                system,
                date,
                time,
                attackers: read_participants(attackers.as_deref())?,
                defenders: read_participants(defenders.as_deref())?,
                events,
            }),
            character.map(Session::without_token),
        ),
        Command::Normalize { .. }
        | Command::Recent { .. }
        | Command::List
        | Command::Show { .. } => anyhow::bail!("not a report-generating command"),
    })
}

fn read_participants(path: Option<&Path>) -> anyhow::Result<Vec<ManualParticipant>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing participants in {}", path.display()))
}

fn open_store(explicit: Option<&Path>) -> anyhow::Result<JsonlStore> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => Config::load()?.store.resolved_path(),
    };
    Ok(JsonlStore::open(path)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    if debug {
        let path = std::env::temp_dir().join("brgen-debug.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("brgen debug log started — tail -f {}", path.display());
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }
    Ok(())
}
