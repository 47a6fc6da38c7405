//! Engine orchestration: one ledger, two simulators, sticky state.
//!
//! The tick contract is ingest -> apply_decay -> detect_state. Decay and
//! detection both take an explicit `now` so replays and tests drive the
//! clock; nothing in here reads wall time.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::fleet::{FleetSimulator, SupplyMetrics};
use crate::ledger::EventLedger;
use crate::logging;
use crate::models::{
    MarketEvent, MarketRegime, MarketSnapshot, PriceRecord, StateRecord, SystemState, Tanker,
    Ticker, TickerSummary,
};
use crate::regime::{self, RiskBand};
use crate::simulator::AssetSimulator;

/// Observer invoked for every accepted event. Persistence hangs off this
/// so the engine itself never touches a database.
pub trait EventSink {
    fn on_event(&mut self, event: &MarketEvent) -> Result<()>;
}

/// Default sink: discard.
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&mut self, _event: &MarketEvent) -> Result<()> {
        Ok(())
    }
}

pub struct IntelligenceEngine {
    ledger: EventLedger,
    assets: AssetSimulator,
    fleet: FleetSimulator,
    rng: StdRng,
    current_state: SystemState,
    current_regime: MarketRegime,
    top_events: usize,
    last_risk: f64,
}

impl IntelligenceEngine {
    pub fn new(cfg: &Config, start_ts: u64) -> Self {
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let fleet = FleetSimulator::new(cfg.fleet_size, &mut rng);
        Self {
            ledger: EventLedger::new(cfg.decay_rate),
            assets: AssetSimulator::new(start_ts),
            fleet,
            rng,
            current_state: SystemState::Stable,
            current_regime: MarketRegime::LowVol,
            top_events: cfg.top_events,
            last_risk: 0.0,
        }
    }

    /// Accept an event into the ledger, notifying the sink first. A sink
    /// failure rejects the event so the store and the ledger cannot
    /// disagree about what was ingested.
    pub fn ingest(&mut self, event: MarketEvent, sink: &mut dyn EventSink) -> Result<()> {
        sink.on_event(&event)?;
        logging::log_event_ingested(&event.event_type, &event.description, event.base_impact);
        self.ledger.ingest(event);
        Ok(())
    }

    /// Re-weigh and prune the ledger against `now`.
    pub fn apply_decay(&mut self, now: u64) {
        self.ledger.apply_decay(now);
        self.last_risk = self.ledger.total_risk();
    }

    /// Classify the current risk, advance both simulators one tick under
    /// the resulting band, and emit a snapshot.
    pub fn detect_state(&mut self, now: u64) -> MarketSnapshot {
        let risk = self.ledger.total_risk();
        let previous = (self.current_state, self.current_regime);
        let (state, regime) = regime::classify(risk, previous);
        if state != self.current_state {
            logging::log_state_transition(self.current_state.as_str(), state.as_str(), risk);
        }
        self.current_state = state;
        self.current_regime = regime;
        self.last_risk = risk;

        self.assets.update_prices(now, risk, &mut self.rng);
        self.fleet.update(RiskBand::of(risk), &mut self.rng);

        logging::log_tick(now, state.as_str(), risk, self.ledger.len());

        MarketSnapshot {
            ts: now,
            state,
            risk_score: risk,
            active_events: self.ledger.top_k(self.top_events),
            regime,
        }
    }

    pub fn get_ticker(&self, symbol: &str) -> Option<&Ticker> {
        self.assets.get(symbol)
    }

    pub fn get_all_tickers(&self) -> Vec<TickerSummary> {
        self.assets.summaries()
    }

    pub fn top_movers(&self) -> Vec<TickerSummary> {
        self.assets.top_movers()
    }

    pub fn tankers(&self) -> &[Tanker] {
        self.fleet.tankers()
    }

    pub fn supply_metrics(&self) -> SupplyMetrics {
        self.fleet.supply_metrics()
    }

    pub fn state(&self) -> SystemState {
        self.current_state
    }

    pub fn regime(&self) -> MarketRegime {
        self.current_regime
    }

    pub fn total_risk(&self) -> f64 {
        self.last_risk
    }

    pub fn active_event_count(&self) -> usize {
        self.ledger.len()
    }

    /// Per-ticker rows for the external store, one per instrument at the
    /// latest tick.
    pub fn price_records(&self, now: u64) -> Vec<PriceRecord> {
        self.assets
            .symbols()
            .iter()
            .filter_map(|s| self.assets.get(s))
            .map(|t| PriceRecord {
                ts: now,
                symbol: t.symbol.clone(),
                price: t.current_price,
                change_pct: t.change_pct,
                volume: t.history.back().map(|p| p.volume).unwrap_or(0),
            })
            .collect()
    }

    pub fn state_record(&self, now: u64) -> StateRecord {
        StateRecord {
            ts: now,
            state: self.current_state,
            risk_score: self.last_risk,
            regime: self.current_regime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
        Config {
            decay_rate: 0.1,
            tick_secs: 2,
            sqlite_path: ":memory:".to_string(),
            seed: Some(42),
            fleet_size: 6,
            injection_prob: 0.0,
            top_events: 5,
        }
    }

    fn event(ts: u64, impact: f64) -> MarketEvent {
        MarketEvent {
            ts,
            event_type: "NEWS".to_string(),
            description: format!("impact {}", impact),
            base_impact: impact,
            asset_class: "GENERAL".to_string(),
        }
    }

    struct FailingSink;
    impl EventSink for FailingSink {
        fn on_event(&mut self, _event: &MarketEvent) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn test_starts_stable_low_vol() {
        let engine = IntelligenceEngine::new(&cfg(), 1_000);
        assert_eq!(engine.state(), SystemState::Stable);
        assert_eq!(engine.regime(), MarketRegime::LowVol);
        assert_eq!(engine.total_risk(), 0.0);
    }

    #[test]
    fn test_crash_scenario_three_heavy_events() {
        let mut engine = IntelligenceEngine::new(&cfg(), 1_000);
        let mut sink = NullSink;
        for _ in 0..3 {
            engine.ingest(event(1_000, 9.0), &mut sink).unwrap();
        }
        engine.apply_decay(1_000);
        let snap = engine.detect_state(1_000);
        assert!((snap.risk_score - 27.0).abs() < 1e-9);
        assert_eq!(snap.state, SystemState::Crash);
        assert_eq!(snap.regime, MarketRegime::HighVol);
        assert_eq!(snap.active_events.len(), 3);
    }

    #[test]
    fn test_dead_zone_keeps_crash_state() {
        let mut engine = IntelligenceEngine::new(&cfg(), 1_000);
        let mut sink = NullSink;
        for _ in 0..3 {
            engine.ingest(event(1_000, 9.0), &mut sink).unwrap();
        }
        engine.apply_decay(1_000);
        engine.detect_state(1_000);
        assert_eq!(engine.state(), SystemState::Crash);

        // Decayed into 5..=15 hours later: no transition fires.
        // 27 * e^(-0.1 * 10h) ~= 9.93
        let later = 1_000 + 10 * 3600;
        engine.apply_decay(later);
        let snap = engine.detect_state(later);
        assert!(snap.risk_score > 5.0 && snap.risk_score < 15.0);
        assert_eq!(snap.state, SystemState::Crash);
    }

    #[test]
    fn test_failed_sink_rejects_event() {
        let mut engine = IntelligenceEngine::new(&cfg(), 1_000);
        let mut sink = FailingSink;
        assert!(engine.ingest(event(1_000, 5.0), &mut sink).is_err());
        assert_eq!(engine.active_event_count(), 0);
    }

    #[test]
    fn test_snapshot_top_events_capped_and_sorted() {
        let mut engine = IntelligenceEngine::new(&cfg(), 1_000);
        let mut sink = NullSink;
        for i in 1..=8 {
            engine.ingest(event(1_000, i as f64), &mut sink).unwrap();
        }
        engine.apply_decay(1_000);
        let snap = engine.detect_state(1_000);
        assert_eq!(snap.active_events.len(), 5);
        assert!((snap.active_events[0].current_weight - 8.0).abs() < 1e-9);
        for w in snap.active_events.windows(2) {
            assert!(w[0].current_weight >= w[1].current_weight);
        }
    }

    #[test]
    fn test_records_match_snapshot() {
        let mut engine = IntelligenceEngine::new(&cfg(), 1_000);
        let mut sink = NullSink;
        engine.ingest(event(1_000, 9.0), &mut sink).unwrap();
        engine.apply_decay(1_000);
        let snap = engine.detect_state(1_060);

        let state = engine.state_record(1_060);
        assert_eq!(state.state, snap.state);
        assert_eq!(state.risk_score, snap.risk_score);

        let prices = engine.price_records(1_060);
        assert_eq!(prices.len(), 10);
        let spx = prices.iter().find(|p| p.symbol == "SPX").unwrap();
        assert_eq!(spx.price, engine.get_ticker("SPX").unwrap().current_price);
    }

    #[test]
    fn test_seeded_engines_reproduce() {
        let mut a = IntelligenceEngine::new(&cfg(), 1_000);
        let mut b = IntelligenceEngine::new(&cfg(), 1_000);
        let mut sink = NullSink;
        for t in 1..=30u64 {
            let now = 1_000 + t * 60;
            if t % 5 == 0 {
                a.ingest(event(now, 6.0), &mut sink).unwrap();
                b.ingest(event(now, 6.0), &mut sink).unwrap();
            }
            a.apply_decay(now);
            b.apply_decay(now);
            let sa = a.detect_state(now);
            let sb = b.detect_state(now);
            assert_eq!(sa.state, sb.state);
            assert_eq!(sa.risk_score, sb.risk_score);
        }
        for (x, y) in a.get_all_tickers().iter().zip(b.get_all_tickers().iter()) {
            assert_eq!(x.price, y.price);
        }
        for (x, y) in a.tankers().iter().zip(b.tankers().iter()) {
            assert_eq!(x.location, y.location);
        }
    }

    #[test]
    fn test_unknown_ticker_is_none() {
        let engine = IntelligenceEngine::new(&cfg(), 1_000);
        assert!(engine.get_ticker("GME").is_none());
    }
}
