//! Configuration types for brgen.
//!
//! [`Config::load`] reads `~/.config/brgen/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist, then applies `BRGEN_*`
//! environment overrides (`BRGEN_ESI__BASE_URL=...`). [`Config::defaults`]
//! returns the built-in defaults without touching the filesystem (useful in
//! tests).

use serde::Deserialize;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[esi]
base_url     = "https://esi.evetech.net/latest"
datasource   = "tranquility"
user_agent   = "brgen/0.1 (battle report generator)"
timeout_secs = 15

[zkb]
user_agent   = "brgen/0.1 (battle report generator)"
timeout_secs = 20

[store]
path = ""
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/brgen/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub esi: EsiConfig,
    #[serde(default)]
    pub zkb: ZkbConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// `[esi]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EsiConfig {
    #[serde(default = "default_esi_base_url")]
    pub base_url: String,
    #[serde(default = "default_datasource")]
    pub datasource: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_esi_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_esi_base_url() -> String { "https://esi.evetech.net/latest".to_string() }
fn default_datasource() -> String { "tranquility".to_string() }
fn default_user_agent() -> String { "brgen/0.1 (battle report generator)".to_string() }
fn default_esi_timeout_secs() -> u64 { 15 }

impl Default for EsiConfig {
    fn default() -> Self {
        Self {
            base_url: default_esi_base_url(),
            datasource: default_datasource(),
            user_agent: default_user_agent(),
            timeout_secs: default_esi_timeout_secs(),
        }
    }
}

/// `[zkb]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ZkbConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_zkb_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_zkb_timeout_secs() -> u64 { 20 }

impl Default for ZkbConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_zkb_timeout_secs(),
        }
    }
}

/// `[store]` section of `config.toml`. An empty `path` means the default
/// location next to the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub path: String,
}

impl StoreConfig {
    /// Resolved store file path.
    pub fn resolved_path(&self) -> PathBuf {
        if self.path.is_empty() {
            config_dir().join("reports.jsonl")
        } else {
            PathBuf::from(&self.path)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/brgen/config.toml`, layered on top of the
    /// built-in defaults and under `BRGEN_*` environment overrides. Creates
    /// the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path.as_path()).required(false))
            .add_source(
                config::Environment::with_prefix("BRGEN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("brgen")
}

fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
