//! Core data types shared across the engine and simulators.
//!
//! Timestamps are epoch seconds throughout; chrono is only used at the
//! edges (driver, logging) for human-readable output.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Bounded price history length per ticker. Oldest point evicted first.
pub const HISTORY_WINDOW: usize = 100;

/// Discrete market state driven by aggregate event risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemState {
    Stable,
    HighVolatility,
    BullRun,
    BearMarket,
    Crash,
}

impl SystemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemState::Stable => "STABLE",
            SystemState::HighVolatility => "HIGH_VOLATILITY",
            SystemState::BullRun => "BULL_RUN",
            SystemState::BearMarket => "BEAR_MARKET",
            SystemState::Crash => "CRASH",
        }
    }
}

/// Volatility regime paired with the system state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketRegime {
    LowVol,
    HighVol,
    TrendingUp,
    TrendingDown,
}

impl MarketRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketRegime::LowVol => "LOW_VOL",
            MarketRegime::HighVol => "HIGH_VOL",
            MarketRegime::TrendingUp => "TRENDING_UP",
            MarketRegime::TrendingDown => "TRENDING_DOWN",
        }
    }
}

/// A news-like event as delivered by an external feed. Immutable once
/// created; the ingestion layer validates before handing it to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketEvent {
    pub ts: u64,
    pub event_type: String,
    pub description: String,
    /// Documented range 0.0..=10.0; not clamped on ingest.
    pub base_impact: f64,
    pub asset_class: String,
}

/// A ledger-owned event with its decaying weight. `relevance_score` keeps
/// the initial weight; `current_weight` is rewritten on every decay pass.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedEvent {
    pub event: MarketEvent,
    pub current_weight: f64,
    pub relevance_score: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PricePoint {
    pub ts: u64,
    pub price: f64,
    pub volume: u64,
}

/// A simulated instrument with its bounded price history.
#[derive(Debug, Clone, Serialize)]
pub struct Ticker {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    /// Change relative to the oldest point still retained in `history`,
    /// not the previous tick. The window-relative definition is kept for
    /// compatibility with downstream consumers.
    pub change_pct: f64,
    pub history: VecDeque<PricePoint>,
    pub sector: String,
}

impl Ticker {
    pub fn new(symbol: &str, name: &str, price: f64, sector: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            current_price: price,
            change_pct: 0.0,
            history: VecDeque::with_capacity(HISTORY_WINDOW),
            sector: sector.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TankerStatus {
    Moving,
    Anchored,
    Loading,
}

/// A mobile supply asset tracked by the fleet simulator.
#[derive(Debug, Clone, Serialize)]
pub struct Tanker {
    pub id: String,
    pub name: String,
    pub location: GeoPoint,
    /// Key of a waypoint node in the fleet's port table.
    pub destination: String,
    pub status: TankerStatus,
    /// 0..=100 percent.
    pub cargo_level: f64,
    /// Degrees, atan2(dx, dy) convention.
    pub heading: f64,
}

/// Immutable output of one `detect_state` tick.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub ts: u64,
    pub state: SystemState,
    pub risk_score: f64,
    /// Top events by current weight, heaviest first.
    pub active_events: Vec<ProcessedEvent>,
    pub regime: MarketRegime,
}

/// Read-only ticker projection for presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct TickerSummary {
    pub symbol: String,
    pub price: f64,
    pub change_pct: f64,
    pub sector: String,
    /// Last closes for sparkline rendering.
    pub history: Vec<f64>,
}

/// Per-ticker record emitted after each tick for an external store.
#[derive(Debug, Clone, Serialize)]
pub struct PriceRecord {
    pub ts: u64,
    pub symbol: String,
    pub price: f64,
    pub change_pct: f64,
    pub volume: u64,
}

/// System-state record emitted after each tick for an external store.
#[derive(Debug, Clone, Serialize)]
pub struct StateRecord {
    pub ts: u64,
    pub state: SystemState,
    pub risk_score: f64,
    pub regime: MarketRegime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_labels_roundtrip() {
        for s in [
            SystemState::Stable,
            SystemState::HighVolatility,
            SystemState::BullRun,
            SystemState::BearMarket,
            SystemState::Crash,
        ] {
            let json = serde_json::to_string(&s).unwrap();
            assert_eq!(json, format!("\"{}\"", s.as_str()));
        }
    }

    #[test]
    fn test_regime_labels_roundtrip() {
        for r in [
            MarketRegime::LowVol,
            MarketRegime::HighVol,
            MarketRegime::TrendingUp,
            MarketRegime::TrendingDown,
        ] {
            let json = serde_json::to_string(&r).unwrap();
            assert_eq!(json, format!("\"{}\"", r.as_str()));
        }
    }

    #[test]
    fn test_market_event_deserialize() {
        let raw = r#"{"ts":1704100500,"event_type":"NEWS","description":"CPI print above consensus","base_impact":7.5,"asset_class":"GENERAL"}"#;
        let evt: MarketEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(evt.event_type, "NEWS");
        assert!((evt.base_impact - 7.5).abs() < f64::EPSILON);
    }
}
