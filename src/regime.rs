//! Threshold-based regime classification with sticky transitions.
//!
//! Aggregate risk is bucketed into bands; each band either forces a
//! (state, regime) pair or retains the previous one. The retain branch is
//! an explicit table entry so the hysteresis in the 5..=15 band is visible
//! and testable rather than an accident of an if/else chain.

use serde::Serialize;

use crate::models::{MarketRegime, SystemState};

pub const CRASH_THRESHOLD: f64 = 25.0;
pub const HIGH_VOL_THRESHOLD: f64 = 15.0;
pub const STABLE_THRESHOLD: f64 = 5.0;

/// Risk band the aggregate score falls into. Shared by the classifier and
/// the price simulator so both react to the same thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskBand {
    Crash,
    Elevated,
    /// 5..=15: no transition, previous state carries over.
    DeadZone,
    Calm,
}

impl RiskBand {
    pub fn of(total_risk: f64) -> Self {
        if total_risk > CRASH_THRESHOLD {
            RiskBand::Crash
        } else if total_risk > HIGH_VOL_THRESHOLD {
            RiskBand::Elevated
        } else if total_risk < STABLE_THRESHOLD {
            RiskBand::Calm
        } else {
            RiskBand::DeadZone
        }
    }

    /// Price-drift bias and volatility multiplier applied by the asset
    /// simulator under this band.
    pub fn sim_params(&self) -> (f64, f64) {
        match self {
            RiskBand::Crash => (-0.02, 4.0),
            RiskBand::Elevated => (-0.005, 2.0),
            RiskBand::DeadZone => (0.0, 1.0),
            RiskBand::Calm => (0.001, 0.8),
        }
    }

    /// Fleet slowdown under stress; movement speed is scaled by this.
    pub fn speed_factor(&self) -> f64 {
        match self {
            RiskBand::Crash => 0.3,
            RiskBand::Elevated => 0.7,
            RiskBand::DeadZone | RiskBand::Calm => 1.0,
        }
    }
}

/// Transition table: `None` means the previous (state, regime) is retained.
const TRANSITIONS: [(RiskBand, Option<(SystemState, MarketRegime)>); 4] = [
    (RiskBand::Crash, Some((SystemState::Crash, MarketRegime::HighVol))),
    (
        RiskBand::Elevated,
        Some((SystemState::HighVolatility, MarketRegime::HighVol)),
    ),
    (RiskBand::DeadZone, None),
    (RiskBand::Calm, Some((SystemState::Stable, MarketRegime::LowVol))),
];

/// Classify `total_risk` against the previous pair. Total over all risk
/// values; the dead zone returns the inputs unchanged.
pub fn classify(
    total_risk: f64,
    previous: (SystemState, MarketRegime),
) -> (SystemState, MarketRegime) {
    let band = RiskBand::of(total_risk);
    TRANSITIONS
        .iter()
        .find(|(b, _)| *b == band)
        .and_then(|(_, next)| *next)
        .unwrap_or(previous)
}
