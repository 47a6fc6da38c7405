//! Runtime configuration, environment-driven.

#[derive(Debug, Clone)]
pub struct Config {
    /// Per-hour exponential decay rate for event weights.
    pub decay_rate: f64,
    pub tick_secs: u64,
    pub sqlite_path: String,
    /// Seed for the engine RNG; None means seed from entropy.
    pub seed: Option<u64>,
    pub fleet_size: usize,
    /// Chance per tick that the random feed injects a headline.
    pub injection_prob: f64,
    pub top_events: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            decay_rate: std::env::var("DECAY_RATE").ok().and_then(|v| v.parse().ok()).unwrap_or(0.1),
            tick_secs: std::env::var("TICK_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(2),
            sqlite_path: std::env::var("SQLITE_PATH").unwrap_or_else(|_| "./financex.sqlite".to_string()),
            seed: std::env::var("SEED").ok().and_then(|v| v.parse().ok()),
            fleet_size: std::env::var("FLEET_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(12),
            injection_prob: std::env::var("INJECT_PROB").ok().and_then(|v| v.parse().ok()).unwrap_or(0.05),
            top_events: std::env::var("TOP_EVENTS").ok().and_then(|v| v.parse().ok()).unwrap_or(5),
        }
    }

    pub fn sleep_until_next_tick(&self, now_ts: u64) -> u64 {
        let next = ((now_ts / self.tick_secs) + 1) * self.tick_secs;
        next.saturating_sub(now_ts)
    }
}

pub fn now_ts() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Env vars are process-global; only assert fields no test harness
        // would plausibly set.
        let cfg = Config {
            decay_rate: 0.1,
            tick_secs: 2,
            sqlite_path: "./financex.sqlite".to_string(),
            seed: None,
            fleet_size: 12,
            injection_prob: 0.05,
            top_events: 5,
        };
        assert!(cfg.decay_rate > 0.0);
        assert_eq!(cfg.sleep_until_next_tick(7), 1);
        assert_eq!(cfg.sleep_until_next_tick(8), 2);
    }
}
