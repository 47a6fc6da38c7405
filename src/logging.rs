//! Structured JSON-lines logging.
//!
//! One line per record on stdout: timestamp, level, domain, event name and
//! a data object. Level and domain filtering come from the environment so
//! a noisy tick loop can be silenced without code changes.

use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Events,  // Feed ingestion, decay, pruning
    Regime,  // State transitions
    Market,  // Price simulation, ticker summaries
    Fleet,   // Tanker movement, supply metrics
    Persist, // SQLite writes
    System,  // Startup, shutdown, tick loop
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Events => "events",
            Domain::Regime => "regime",
            Domain::Market => "market",
            Domain::Fleet => "fleet",
            Domain::Persist => "persist",
            Domain::System => "system",
        }
    }

    /// LOG_DOMAINS is a comma-separated allowlist, or "all".
    pub fn is_enabled(&self) -> bool {
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

/// RFC3339 timestamp with milliseconds.
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Emit a structured log entry, subject to level and domain filters.
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("domain".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("data".to_string(), Value::Object(fields));
    println!("{}", Value::Object(entry));
}

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

pub fn log_event_ingested(event_type: &str, description: &str, impact: f64) {
    log(
        Level::Info,
        Domain::Events,
        "event_ingested",
        obj(&[
            ("event_type", v_str(event_type)),
            ("description", v_str(description)),
            ("impact", v_num(impact)),
        ]),
    );
}

pub fn log_state_transition(from: &str, to: &str, risk: f64) {
    log(
        Level::Info,
        Domain::Regime,
        "state_transition",
        obj(&[("from", v_str(from)), ("to", v_str(to)), ("risk", v_num(risk))]),
    );
}

pub fn log_tick(ts: u64, state: &str, risk: f64, active_events: usize) {
    log(
        Level::Debug,
        Domain::System,
        "tick",
        obj(&[
            ("tick_ts", json!(ts)),
            ("state", v_str(state)),
            ("risk", v_num(risk)),
            ("active_events", json!(active_events)),
        ]),
    );
}
