//! Data-parallel math over event and asset arrays.
//!
//! One tick's shared parameters (now, decay rate, risk band) are computed
//! once and applied element-wise; per-element results are independent, so
//! every function here has a scalar counterpart it must match to floating
//! tolerance.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::decay;

/// Decay all event weights against `now`. Output order matches input.
pub fn decay_batch(weights: &[f64], timestamps: &[u64], now: u64, rate: f64) -> Vec<f64> {
    weights
        .iter()
        .zip(timestamps.iter())
        .map(|(&w, &ts)| decay::decay(w, decay::age_hours(now, ts), rate))
        .collect()
}

/// One instrument's price step: normal shock scaled by the band multiplier
/// plus the band bias. Instruments with `invert_bias` (volatility indices)
/// move against broad-market sentiment: `shock - bias * 5`.
pub fn price_step<R: Rng>(
    price: f64,
    base_vol: f64,
    invert_bias: bool,
    bias: f64,
    vol_mult: f64,
    rng: &mut R,
) -> f64 {
    let sd = base_vol * vol_mult;
    let shock = if sd > 0.0 {
        match Normal::new(0.0, sd) {
            Ok(dist) => dist.sample(rng),
            Err(_) => 0.0,
        }
    } else {
        0.0
    };
    let pct = if invert_bias { shock - bias * 5.0 } else { shock + bias };
    round2(price * (1.0 + pct))
}

/// Price step across the whole universe with shared band parameters and
/// independent per-instrument noise. Draw order follows input order, so a
/// cloned RNG reproduces the scalar path exactly.
pub fn update_prices<R: Rng>(
    prices: &[f64],
    base_vols: &[f64],
    invert_bias: &[bool],
    bias: f64,
    vol_mult: f64,
    rng: &mut R,
) -> Vec<f64> {
    prices
        .iter()
        .zip(base_vols.iter())
        .zip(invert_bias.iter())
        .map(|((&p, &v), &inv)| price_step(p, v, inv, bias, vol_mult, rng))
        .collect()
}

/// Prices are quoted to cents.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Distance below which a mobile asset counts as arrived.
pub const ARRIVAL_DISTANCE: f64 = 2.0;
/// Base step length per tick before the regime slowdown is applied.
pub const BASE_SPEED: f64 = 0.8;
/// Floor on the distance divisor so a zero-length vector never produces
/// NaN positions.
pub const DISTANCE_EPSILON: f64 = 0.001;

#[derive(Debug, Clone)]
pub struct FleetStep {
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    /// Degrees; zero for assets that did not move this tick, callers keep
    /// the previous heading for those.
    pub headings: Vec<f64>,
    pub arrived: Vec<bool>,
}

/// Advance all moving assets toward their destinations in one pass.
/// Assets that are within [`ARRIVAL_DISTANCE`] are flagged and not moved;
/// non-moving assets pass through untouched.
pub fn move_fleet(
    lats: &[f64],
    lons: &[f64],
    dest_lats: &[f64],
    dest_lons: &[f64],
    moving: &[bool],
    speed_factor: f64,
) -> FleetStep {
    let n = lats.len();
    let mut out = FleetStep {
        lats: lats.to_vec(),
        lons: lons.to_vec(),
        headings: vec![0.0; n],
        arrived: vec![false; n],
    };
    let speed = BASE_SPEED * speed_factor;

    for i in 0..n {
        if !moving[i] {
            continue;
        }
        let dy = dest_lats[i] - lats[i];
        let dx = dest_lons[i] - lons[i];
        let dist = (dx * dx + dy * dy).sqrt().max(DISTANCE_EPSILON);
        if dist < ARRIVAL_DISTANCE {
            out.arrived[i] = true;
            continue;
        }
        out.lats[i] = lats[i] + (dy / dist) * speed;
        out.lons[i] = lons[i] + (dx / dist) * speed;
        out.headings[i] = dx.atan2(dy).to_degrees();
    }
    out
}
