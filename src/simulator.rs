//! Per-tick stochastic price evolution for the fixed instrument universe.
//!
//! All instruments share the tick's risk-derived bias and volatility
//! multiplier; noise is independent per instrument, so the update runs as
//! one batched pass over the price array.

use std::collections::HashMap;

use rand::Rng;

use crate::batch;
use crate::models::{PricePoint, Ticker, TickerSummary, HISTORY_WINDOW};
use crate::regime::RiskBand;

/// Sparkline length exposed to presentation layers.
const SPARKLINE_POINTS: usize = 30;

struct InstrumentSpec {
    symbol: &'static str,
    name: &'static str,
    start_price: f64,
    sector: &'static str,
    base_vol: f64,
    /// Volatility indices move against broad-market sentiment.
    invert_bias: bool,
}

const UNIVERSE: [InstrumentSpec; 10] = [
    InstrumentSpec { symbol: "SPX", name: "S&P 500", start_price: 4800.0, sector: "GENERAL", base_vol: 0.002, invert_bias: false },
    InstrumentSpec { symbol: "NDX", name: "Nasdaq 100", start_price: 16800.0, sector: "GENERAL", base_vol: 0.002, invert_bias: false },
    InstrumentSpec { symbol: "BTC", name: "Bitcoin", start_price: 42000.0, sector: "GENERAL", base_vol: 0.01, invert_bias: false },
    InstrumentSpec { symbol: "VIX", name: "Volatility", start_price: 14.0, sector: "GENERAL", base_vol: 0.05, invert_bias: true },
    InstrumentSpec { symbol: "AAPL", name: "Apple Inc.", start_price: 185.0, sector: "TECH", base_vol: 0.002, invert_bias: false },
    InstrumentSpec { symbol: "NVDA", name: "NVIDIA", start_price: 550.0, sector: "TECH", base_vol: 0.002, invert_bias: false },
    InstrumentSpec { symbol: "JPM", name: "JPMorgan", start_price: 170.0, sector: "FINANCE", base_vol: 0.002, invert_bias: false },
    InstrumentSpec { symbol: "XOM", name: "Exxon Mobil", start_price: 100.0, sector: "ENERGY", base_vol: 0.002, invert_bias: false },
    InstrumentSpec { symbol: "WTI", name: "Crude Oil (WTI)", start_price: 72.50, sector: "ENERGY", base_vol: 0.008, invert_bias: false },
    InstrumentSpec { symbol: "BRENT", name: "Crude Oil (Brent)", start_price: 77.80, sector: "ENERGY", base_vol: 0.008, invert_bias: false },
];

pub struct AssetSimulator {
    tickers: HashMap<String, Ticker>,
    /// Fixed iteration order for the batched update and projections.
    order: Vec<String>,
}

impl AssetSimulator {
    /// Build the universe with one seed point per ticker at `start_ts`.
    pub fn new(start_ts: u64) -> Self {
        let mut tickers = HashMap::new();
        let mut order = Vec::with_capacity(UNIVERSE.len());
        for spec in UNIVERSE.iter() {
            let mut t = Ticker::new(spec.symbol, spec.name, spec.start_price, spec.sector);
            t.history.push_back(PricePoint { ts: start_ts, price: spec.start_price, volume: 0 });
            order.push(spec.symbol.to_string());
            tickers.insert(spec.symbol.to_string(), t);
        }
        Self { tickers, order }
    }

    /// Advance every instrument one tick under the current risk score.
    pub fn update_prices<R: Rng>(&mut self, now: u64, system_risk: f64, rng: &mut R) {
        let band = RiskBand::of(system_risk);
        let (bias, vol_mult) = band.sim_params();

        let prices: Vec<f64> = self
            .order
            .iter()
            .map(|s| self.tickers[s].current_price)
            .collect();
        let base_vols: Vec<f64> = UNIVERSE.iter().map(|s| s.base_vol).collect();
        let invert: Vec<bool> = UNIVERSE.iter().map(|s| s.invert_bias).collect();

        let new_prices = batch::update_prices(&prices, &base_vols, &invert, bias, vol_mult, rng);

        for (i, symbol) in self.order.iter().enumerate() {
            let Some(ticker) = self.tickers.get_mut(symbol) else {
                continue;
            };
            ticker.current_price = new_prices[i];

            let volume = (rng.gen_range(1000.0..5000.0) * vol_mult) as u64;
            ticker.history.push_back(PricePoint { ts: now, price: new_prices[i], volume });
            while ticker.history.len() > HISTORY_WINDOW {
                ticker.history.pop_front();
            }

            // Change relative to the start of the retained window, not the
            // previous tick. Kept as-is for downstream compatibility.
            if let Some(oldest) = ticker.history.front() {
                let base = oldest.price.abs().max(f64::EPSILON);
                ticker.change_pct = (ticker.current_price - oldest.price) / base * 100.0;
            }
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&Ticker> {
        self.tickers.get(symbol)
    }

    pub fn symbols(&self) -> &[String] {
        &self.order
    }

    /// Read-only projections with sparkline history, in universe order.
    pub fn summaries(&self) -> Vec<TickerSummary> {
        self.order
            .iter()
            .map(|s| {
                let t = &self.tickers[s];
                let skip = t.history.len().saturating_sub(SPARKLINE_POINTS);
                TickerSummary {
                    symbol: t.symbol.clone(),
                    price: t.current_price,
                    change_pct: t.change_pct,
                    sector: t.sector.clone(),
                    history: t.history.iter().skip(skip).map(|p| p.price).collect(),
                }
            })
            .collect()
    }

    /// Tickers ranked by percent change, best first. Presentation helper
    /// for top-movers views.
    pub fn top_movers(&self) -> Vec<TickerSummary> {
        let mut all = self.summaries();
        all.sort_by(|a, b| {
            b.change_pct
                .partial_cmp(&a.change_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_universe_seeded_with_start_point() {
        let sim = AssetSimulator::new(1_704_099_600);
        assert_eq!(sim.symbols().len(), 10);
        let spx = sim.get("SPX").unwrap();
        assert_eq!(spx.current_price, 4800.0);
        assert_eq!(spx.history.len(), 1);
        assert_eq!(spx.history[0].volume, 0);
    }

    #[test]
    fn test_unknown_symbol_is_none() {
        let sim = AssetSimulator::new(0);
        assert!(sim.get("TSLA").is_none());
    }

    #[test]
    fn test_history_bounded_fifo() {
        let mut sim = AssetSimulator::new(0);
        let mut rng = StdRng::seed_from_u64(42);
        for i in 1..=150u64 {
            sim.update_prices(i * 60, 0.0, &mut rng);
        }
        let btc = sim.get("BTC").unwrap();
        assert_eq!(btc.history.len(), HISTORY_WINDOW);
        // 151 points total were appended; the oldest 51 are gone and the
        // front of the window is tick 51.
        assert_eq!(btc.history.front().unwrap().ts, 51 * 60);
        assert_eq!(btc.history.back().unwrap().ts, 150 * 60);
    }

    #[test]
    fn test_change_pct_relative_to_window_start() {
        let mut sim = AssetSimulator::new(0);
        let mut rng = StdRng::seed_from_u64(7);
        for i in 1..=10u64 {
            sim.update_prices(i * 60, 0.0, &mut rng);
        }
        let spx = sim.get("SPX").unwrap();
        let oldest = spx.history.front().unwrap().price;
        let expected = (spx.current_price - oldest) / oldest * 100.0;
        assert!((spx.change_pct - expected).abs() < 1e-9);
    }

    #[test]
    fn test_seeded_runs_reproduce() {
        let mut a = AssetSimulator::new(0);
        let mut b = AssetSimulator::new(0);
        let mut rng_a = StdRng::seed_from_u64(1234);
        let mut rng_b = StdRng::seed_from_u64(1234);
        for i in 1..=20u64 {
            a.update_prices(i * 60, 18.0, &mut rng_a);
            b.update_prices(i * 60, 18.0, &mut rng_b);
        }
        for sym in a.symbols() {
            assert_eq!(
                a.get(sym).unwrap().current_price,
                b.get(sym).unwrap().current_price,
                "{} diverged",
                sym
            );
        }
    }

    #[test]
    fn test_crash_volume_scaled() {
        let mut calm = AssetSimulator::new(0);
        let mut crash = AssetSimulator::new(0);
        let mut rng_a = StdRng::seed_from_u64(5);
        let mut rng_b = StdRng::seed_from_u64(5);
        calm.update_prices(60, 0.0, &mut rng_a);
        crash.update_prices(60, 30.0, &mut rng_b);
        // Same uniform draws, 0.8x vs 4x multiplier.
        let v_calm = calm.get("SPX").unwrap().history.back().unwrap().volume;
        let v_crash = crash.get("SPX").unwrap().history.back().unwrap().volume;
        assert!(v_crash > v_calm);
    }

    #[test]
    fn test_prices_rounded_to_cents() {
        let mut sim = AssetSimulator::new(0);
        let mut rng = StdRng::seed_from_u64(11);
        for i in 1..=5u64 {
            sim.update_prices(i * 60, 30.0, &mut rng);
        }
        for sym in sim.symbols() {
            let p = sim.get(sym).unwrap().current_price;
            assert!((p * 100.0 - (p * 100.0).round()).abs() < 1e-9, "{}", sym);
        }
    }

    #[test]
    fn test_summaries_sparkline_capped_at_30() {
        let mut sim = AssetSimulator::new(0);
        let mut rng = StdRng::seed_from_u64(3);
        for i in 1..=60u64 {
            sim.update_prices(i * 60, 0.0, &mut rng);
        }
        for s in sim.summaries() {
            assert_eq!(s.history.len(), 30);
        }
    }

    #[test]
    fn test_top_movers_sorted_descending() {
        let mut sim = AssetSimulator::new(0);
        let mut rng = StdRng::seed_from_u64(9);
        for i in 1..=40u64 {
            sim.update_prices(i * 60, 20.0, &mut rng);
        }
        let movers = sim.top_movers();
        for w in movers.windows(2) {
            assert!(w[0].change_pct >= w[1].change_pct);
        }
    }
}
