//! Event sources feeding the engine.
//!
//! A feed is polled once per tick and may return zero or more events. Two
//! implementations: a scripted scenario for demos and tests, and a seeded
//! random injector that fabricates headlines at a configured rate.

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::Rng;

use crate::models::MarketEvent;

#[async_trait]
pub trait EventFeed {
    /// Events that became due at or before `now`. Each event is delivered
    /// exactly once.
    async fn poll(&mut self, now: u64) -> Result<Vec<MarketEvent>>;
}

/// Fixed event timeline, delivered in order as the clock passes each entry.
pub struct ScriptedScenario {
    script: Vec<MarketEvent>,
    next: usize,
}

impl ScriptedScenario {
    pub fn new(mut script: Vec<MarketEvent>) -> Self {
        script.sort_by_key(|e| e.ts);
        Self { script, next: 0 }
    }

    /// The stock trading-day demo: open, an inflation shock, a rumor, a
    /// sector sell-off, an exchange halt, and a late reassurance.
    /// Timestamps are offsets from `open_ts` (a 09:30 session open).
    pub fn trading_day(open_ts: u64) -> Self {
        let mk = |mins: u64, event_type: &str, description: &str, impact: f64, class: &str| {
            MarketEvent {
                ts: open_ts + mins * 60,
                event_type: event_type.to_string(),
                description: description.to_string(),
                base_impact: impact,
                asset_class: class.to_string(),
            }
        };
        Self::new(vec![
            mk(0, "NEWS", "Market Open - Normal trading", 2.0, "GENERAL"),
            mk(45, "MACRO", "Inflation data release: CPI higher than expected", 7.5, "GENERAL"),
            mk(75, "NEWS", "Rumors of central bank emergency meeting", 6.0, "FINANCE"),
            mk(90, "SECTOR", "Tech sector sell-off begins", 5.0, "TECH"),
            mk(120, "HALT", "Major exchange reports trading halt", 8.0, "GENERAL"),
            mk(270, "NEWS", "Central bank issues reassuring statement", 3.0, "FINANCE"),
        ])
    }

    pub fn remaining(&self) -> usize {
        self.script.len() - self.next
    }
}

#[async_trait]
impl EventFeed for ScriptedScenario {
    async fn poll(&mut self, now: u64) -> Result<Vec<MarketEvent>> {
        let mut due = Vec::new();
        while self.next < self.script.len() && self.script[self.next].ts <= now {
            due.push(self.script[self.next].clone());
            self.next += 1;
        }
        Ok(due)
    }
}

const HEADLINES: [(&str, &str, f64, f64, &str); 6] = [
    ("NEWS", "Unexpected earnings miss from a major constituent", 3.0, 6.0, "GENERAL"),
    ("MACRO", "Surprise rate decision chatter", 4.0, 8.0, "FINANCE"),
    ("SECTOR", "Chip supply disruption reported", 3.0, 6.5, "TECH"),
    ("ENERGY", "Pipeline outage tightens crude supply", 3.5, 7.0, "ENERGY"),
    ("HALT", "Venue connectivity incident", 5.0, 9.0, "GENERAL"),
    ("NEWS", "Soft guidance from a bellwether bank", 2.0, 5.0, "FINANCE"),
];

/// Random headline injector. At most one event per poll; impact is drawn
/// uniformly from the template's range.
pub struct RandomInjector {
    rng: StdRng,
    prob: f64,
}

impl RandomInjector {
    pub fn new(rng: StdRng, prob: f64) -> Self {
        Self { rng, prob }
    }
}

#[async_trait]
impl EventFeed for RandomInjector {
    async fn poll(&mut self, now: u64) -> Result<Vec<MarketEvent>> {
        if !self.rng.gen_bool(self.prob.clamp(0.0, 1.0)) {
            return Ok(Vec::new());
        }
        let (event_type, description, lo, hi, class) =
            HEADLINES[self.rng.gen_range(0..HEADLINES.len())];
        Ok(vec![MarketEvent {
            ts: now,
            event_type: event_type.to_string(),
            description: description.to_string(),
            base_impact: self.rng.gen_range(lo..hi),
            asset_class: class.to_string(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(f)
    }

    #[test]
    fn test_scripted_delivers_in_order_once() {
        block_on(async {
            let open = 1_704_100_000u64;
            let mut feed = ScriptedScenario::trading_day(open);
            assert_eq!(feed.remaining(), 6);

            let first = feed.poll(open).await.unwrap();
            assert_eq!(first.len(), 1);
            assert_eq!(first[0].description, "Market Open - Normal trading");

            // Re-polling the same instant delivers nothing new.
            assert!(feed.poll(open).await.unwrap().is_empty());

            // Jumping past two entries delivers both, ordered.
            let batch = feed.poll(open + 80 * 60).await.unwrap();
            assert_eq!(batch.len(), 2);
            assert!((batch[0].base_impact - 7.5).abs() < 1e-9);
            assert!((batch[1].base_impact - 6.0).abs() < 1e-9);
            assert_eq!(feed.remaining(), 3);
        });
    }

    #[test]
    fn test_scripted_unsorted_input_is_sorted() {
        block_on(async {
            let mk = |ts: u64| MarketEvent {
                ts,
                event_type: "NEWS".to_string(),
                description: format!("t{}", ts),
                base_impact: 1.0,
                asset_class: "GENERAL".to_string(),
            };
            let mut feed = ScriptedScenario::new(vec![mk(300), mk(100), mk(200)]);
            let all = feed.poll(1_000).await.unwrap();
            let ts: Vec<u64> = all.iter().map(|e| e.ts).collect();
            assert_eq!(ts, vec![100, 200, 300]);
        });
    }

    #[test]
    fn test_injector_never_fires_at_zero_prob() {
        block_on(async {
            let mut feed = RandomInjector::new(StdRng::seed_from_u64(1), 0.0);
            for t in 0..100u64 {
                assert!(feed.poll(t).await.unwrap().is_empty());
            }
        });
    }

    #[test]
    fn test_injector_always_fires_at_full_prob() {
        block_on(async {
            let mut feed = RandomInjector::new(StdRng::seed_from_u64(1), 1.0);
            let events = feed.poll(500).await.unwrap();
            assert_eq!(events.len(), 1);
            let e = &events[0];
            assert_eq!(e.ts, 500);
            assert!(e.base_impact >= 2.0 && e.base_impact < 9.0);
        });
    }

    #[test]
    fn test_injector_seeded_reproducible() {
        block_on(async {
            let mut a = RandomInjector::new(StdRng::seed_from_u64(33), 0.5);
            let mut b = RandomInjector::new(StdRng::seed_from_u64(33), 0.5);
            for t in 0..50u64 {
                let ea = a.poll(t).await.unwrap();
                let eb = b.poll(t).await.unwrap();
                assert_eq!(ea.len(), eb.len());
                for (x, y) in ea.iter().zip(eb.iter()) {
                    assert_eq!(x.description, y.description);
                    assert_eq!(x.base_impact, y.base_impact);
                }
            }
        });
    }
}
