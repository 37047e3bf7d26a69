//! Test builders — ergonomic constructors for raw payloads and generators.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use brgen::{ReportGenerator, Session};
use brgen_core::config::{EsiConfig, ZkbConfig};
use brgen_core::{FixedClock, MemoryStore};
use brgen_feeds::{BearerToken, EsiClient, ZkbClient};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// PayloadBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for raw battle payload JSON.
///
/// # Example
///
/// ```rust
/// let raw = PayloadBuilder::new()
///     .title("Test Battle")
///     .system("Jita")
///     .attacker("Rifter", 1000.0)
///     .defender("Merlin", 1500.0)
///     .event("Explosion at 12:01")
///     .build();
/// ```
#[derive(Default)]
pub struct PayloadBuilder {
    metadata: Map<String, Value>,
    attackers: Vec<Value>,
    defenders: Vec<Value>,
    events: Vec<String>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.metadata.insert("title".into(), title.into());
        self
    }

    pub fn system(mut self, system: &str) -> Self {
        self.metadata.insert("system".into(), system.into());
        self
    }

    pub fn time(mut self, time: &str) -> Self {
        self.metadata.insert("time".into(), time.into());
        self
    }

    pub fn attacker(mut self, ship_type: &str, value: f64) -> Self {
        self.attackers.push(json!({ "ship_type": ship_type, "value": value }));
        self
    }

    pub fn defender(mut self, ship_type: &str, value: f64) -> Self {
        self.defenders.push(json!({ "ship_type": ship_type, "value": value }));
        self
    }

    /// Push an arbitrary attacker record (for provider-specific spellings).
    pub fn attacker_raw(mut self, record: Value) -> Self {
        self.attackers.push(record);
        self
    }

    pub fn defender_raw(mut self, record: Value) -> Self {
        self.defenders.push(record);
        self
    }

    pub fn event(mut self, event: &str) -> Self {
        self.events.push(event.to_string());
        self
    }

    pub fn build(self) -> Value {
        let mut out = Map::new();
        if !self.metadata.is_empty() {
            out.insert("metadata".into(), Value::Object(self.metadata));
        }
        if !self.attackers.is_empty() {
            out.insert("attackers".into(), Value::Array(self.attackers));
        }
        if !self.defenders.is_empty() {
            out.insert("defenders".into(), Value::Array(self.defenders));
        }
        if !self.events.is_empty() {
            out.insert("events".into(), json!(self.events));
        }
        Value::Object(out)
    }
}

// ---------------------------------------------------------------------------
// Clock and generator helpers
// ---------------------------------------------------------------------------

/// The instant every harness treats as "now".
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 11, 12, 0, 0).unwrap()
}

pub type TestGenerator = ReportGenerator<EsiClient, ZkbClient, MemoryStore>;

/// A generator whose ESI client points at `esi_base`, backed by an
/// in-memory store, with a fixed clock.
pub fn generator(esi_base: &str) -> TestGenerator {
    let esi = EsiClient::new(&EsiConfig {
        base_url: esi_base.to_string(),
        timeout_secs: 5,
        ..EsiConfig::default()
    })
    .unwrap();
    let zkb = ZkbClient::new(&ZkbConfig {
        timeout_secs: 5,
        ..ZkbConfig::default()
    })
    .unwrap();
    ReportGenerator::new(esi, zkb, MemoryStore::with_clock(FixedClock(fixed_now())))
        .with_clock(FixedClock(fixed_now()))
}

/// A logged-in session for character `id` with a test token.
pub fn sso_session(id: u64) -> Session {
    Session::new(id, BearerToken::new(TEST_TOKEN))
}

pub const TEST_TOKEN: &str = "test-access-token";
