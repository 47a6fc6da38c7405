//! Rolling statistical bands and price-position analysis.
//!
//! The band math is a pure function over a price history slice. Until a
//! full window of points exists the bands pass the raw price through,
//! which yields a degenerate flat band rather than NaN gaps.

use serde::Serialize;

use crate::models::{PricePoint, Ticker};

pub const BAND_WINDOW: usize = 20;
pub const BAND_NUM_STD: f64 = 2.0;
/// Minimum history length before depth analysis is meaningful.
pub const MIN_DEPTH_POINTS: usize = 20;

#[derive(Debug, Clone)]
pub struct Bands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Rolling mean/stddev bands over the trailing `window` prices. Population
/// standard deviation (divide by N). Output arrays have the same length as
/// the input; indices with fewer than `window` prior points pass the raw
/// price through on all three bands.
pub fn bands(history: &[PricePoint], window: usize, num_std: f64) -> Bands {
    let n = history.len();
    let mut out = Bands {
        upper: Vec::with_capacity(n),
        middle: Vec::with_capacity(n),
        lower: Vec::with_capacity(n),
    };

    for i in 0..n {
        let price = history[i].price;
        if i + 1 < window || window == 0 {
            out.upper.push(price);
            out.middle.push(price);
            out.lower.push(price);
            continue;
        }
        let slice = &history[i + 1 - window..=i];
        let mean = slice.iter().map(|p| p.price).sum::<f64>() / window as f64;
        let var = slice
            .iter()
            .map(|p| {
                let d = p.price - mean;
                d * d
            })
            .sum::<f64>()
            / window as f64;
        let band = var.sqrt() * num_std;
        out.upper.push(mean + band);
        out.middle.push(mean);
        out.lower.push(mean - band);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepthLevel {
    /// Not an error: expected at startup while history fills.
    Insufficient,
    Critical,
    Opportunity,
    Neutral,
}

impl DepthLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepthLevel::Insufficient => "LOW",
            DepthLevel::Critical => "CRITICAL (OVERBOUGHT)",
            DepthLevel::Opportunity => "OPPORTUNITY (OVERSOLD)",
            DepthLevel::Neutral => "NEUTRAL",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            DepthLevel::Insufficient => "INSUFFICIENT DATA",
            DepthLevel::Critical => "SELL / HEDGE",
            DepthLevel::Opportunity => "ACCUMULATE",
            DepthLevel::Neutral => "HOLD",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskDepth {
    pub depth: DepthLevel,
    pub advice: &'static str,
    /// Suggested bid for the classified position.
    pub bid: f64,
    /// `(upper - lower) / middle` at the latest point; 0.0 sentinel when
    /// the middle band is degenerate.
    pub volatility: f64,
}

/// Classify the current price against the latest band. Returns a
/// low-confidence placeholder below [`MIN_DEPTH_POINTS`] of history.
pub fn analyze_risk_depth(ticker: &Ticker) -> RiskDepth {
    let history: Vec<PricePoint> = ticker.history.iter().copied().collect();
    if history.len() < MIN_DEPTH_POINTS {
        return RiskDepth {
            depth: DepthLevel::Insufficient,
            advice: DepthLevel::Insufficient.advice(),
            bid: 0.0,
            volatility: 0.0,
        };
    }

    let b = bands(&history, BAND_WINDOW, BAND_NUM_STD);
    let price = ticker.current_price;
    let upper = *b.upper.last().unwrap_or(&price);
    let middle = *b.middle.last().unwrap_or(&price);
    let lower = *b.lower.last().unwrap_or(&price);

    let (depth, bid) = if price > upper {
        // Target a return toward the mean or below.
        (DepthLevel::Critical, lower)
    } else if price < lower {
        // Aggressive bid just under market.
        (DepthLevel::Opportunity, price * 0.98)
    } else {
        (DepthLevel::Neutral, lower)
    };

    let volatility = if middle.abs() > f64::EPSILON {
        (upper - lower) / middle
    } else {
        0.0
    };

    RiskDepth { depth, advice: depth.advice(), bid, volatility }
}
