//! Tanker fleet simulation over a fixed port graph.
//!
//! Movement is a single batched pass per tick; routing decisions (anchor,
//! reload, reroute) happen per vessel afterwards so the movement math stays
//! pure and testable on its own.

use rand::Rng;

use crate::batch;
use crate::models::{GeoPoint, Tanker, TankerStatus};
use crate::regime::RiskBand;
use serde::Serialize;

/// Probability an arrived vessel drops anchor instead of rerouting.
const ANCHOR_PROB: f64 = 0.2;
/// Probability an anchored vessel starts loading for a new voyage.
const RESUME_PROB: f64 = 0.15;

pub const PORTS: [(&str, f64, f64); 7] = [
    ("HOUSTON", 29.76, -95.36),
    ("ROTTERDAM", 51.92, 4.48),
    ("SINGAPORE", 1.35, 103.82),
    ("FUJAIRAH", 25.12, 56.33),
    ("QINGDAO", 36.07, 120.38),
    ("SANTOS", -23.96, -46.33),
    ("RAS_TANURA", 26.65, 50.17),
];

const VESSEL_NAMES: [&str; 12] = [
    "Meridian Star",
    "Gulf Pioneer",
    "Cape Horizon",
    "Pacific Sentinel",
    "Atlantic Resolve",
    "Strait Voyager",
    "Northern Ember",
    "Coral Monarch",
    "Iron Tide",
    "Amber Route",
    "Delta Crown",
    "Southern Ledger",
];

pub fn port_location(name: &str) -> Option<GeoPoint> {
    PORTS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|&(_, lat, lon)| GeoPoint { lat, lon })
}

/// Aggregate shipping posture for the supply view.
#[derive(Debug, Clone, Serialize)]
pub struct SupplyMetrics {
    pub total_ships: usize,
    /// Mean cargo level across the fleet, 0..=100.
    pub volume_index: f64,
    /// Fraction of the fleet under way.
    pub moving_ratio: f64,
}

pub struct FleetSimulator {
    tankers: Vec<Tanker>,
}

impl FleetSimulator {
    /// Spawn `size` vessels at random ports, each already routed to a
    /// different port.
    pub fn new<R: Rng>(size: usize, rng: &mut R) -> Self {
        let mut tankers = Vec::with_capacity(size);
        for i in 0..size {
            let origin = &PORTS[rng.gen_range(0..PORTS.len())];
            let dest = pick_destination(origin.0, rng);
            let name = VESSEL_NAMES[i % VESSEL_NAMES.len()];
            tankers.push(Tanker {
                id: format!("TKR-{:03}", i + 1),
                name: name.to_string(),
                location: GeoPoint { lat: origin.1, lon: origin.2 },
                destination: dest.to_string(),
                status: TankerStatus::Moving,
                cargo_level: rng.gen_range(20.0..100.0),
                heading: 0.0,
            });
        }
        Self { tankers }
    }

    /// Advance the fleet one tick under the current risk band.
    pub fn update<R: Rng>(&mut self, band: RiskBand, rng: &mut R) {
        let n = self.tankers.len();
        if n == 0 {
            return;
        }

        let lats: Vec<f64> = self.tankers.iter().map(|t| t.location.lat).collect();
        let lons: Vec<f64> = self.tankers.iter().map(|t| t.location.lon).collect();
        let mut dest_lats = vec![0.0; n];
        let mut dest_lons = vec![0.0; n];
        let mut moving = vec![false; n];
        for (i, t) in self.tankers.iter().enumerate() {
            if let Some(p) = port_location(&t.destination) {
                dest_lats[i] = p.lat;
                dest_lons[i] = p.lon;
                moving[i] = t.status == TankerStatus::Moving;
            }
        }

        let step =
            batch::move_fleet(&lats, &lons, &dest_lats, &dest_lons, &moving, band.speed_factor());

        for (i, tanker) in self.tankers.iter_mut().enumerate() {
            match tanker.status {
                TankerStatus::Moving => {
                    if step.arrived[i] {
                        // Cargo is discharged at the destination.
                        tanker.location = port_location(&tanker.destination)
                            .unwrap_or(tanker.location);
                        tanker.cargo_level = 0.0;
                        if rng.gen_bool(ANCHOR_PROB) {
                            tanker.status = TankerStatus::Anchored;
                        } else {
                            tanker.status = TankerStatus::Loading;
                        }
                    } else {
                        tanker.location = GeoPoint { lat: step.lats[i], lon: step.lons[i] };
                        tanker.heading = step.headings[i];
                    }
                }
                TankerStatus::Loading => {
                    // One tick in port, then out with a fresh cargo and route.
                    tanker.cargo_level = rng.gen_range(60.0..100.0);
                    let here = current_port(&tanker.location).unwrap_or("");
                    tanker.destination = pick_destination(here, rng).to_string();
                    tanker.status = TankerStatus::Moving;
                }
                TankerStatus::Anchored => {
                    if rng.gen_bool(RESUME_PROB) {
                        tanker.status = TankerStatus::Loading;
                    }
                }
            }
        }
    }

    pub fn tankers(&self) -> &[Tanker] {
        &self.tankers
    }

    pub fn supply_metrics(&self) -> SupplyMetrics {
        let total = self.tankers.len();
        if total == 0 {
            return SupplyMetrics { total_ships: 0, volume_index: 0.0, moving_ratio: 0.0 };
        }
        let cargo_sum: f64 = self.tankers.iter().map(|t| t.cargo_level).sum();
        let moving = self
            .tankers
            .iter()
            .filter(|t| t.status == TankerStatus::Moving)
            .count();
        SupplyMetrics {
            total_ships: total,
            volume_index: cargo_sum / total as f64,
            moving_ratio: moving as f64 / total as f64,
        }
    }
}

fn pick_destination<R: Rng>(exclude: &str, rng: &mut R) -> &'static str {
    loop {
        let candidate = PORTS[rng.gen_range(0..PORTS.len())].0;
        if candidate != exclude {
            return candidate;
        }
    }
}

/// The port a vessel is sitting at, if it is at one.
fn current_port(loc: &GeoPoint) -> Option<&'static str> {
    PORTS
        .iter()
        .find(|&&(_, lat, lon)| {
            let dy = lat - loc.lat;
            let dx = lon - loc.lon;
            (dx * dx + dy * dy).sqrt() < batch::ARRIVAL_DISTANCE
        })
        .map(|&(n, _, _)| n)
}
