use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tokio::time::{sleep, Duration};

use financex::config::{now_ts, Config};
use financex::engine::{EventSink, IntelligenceEngine};
use financex::feed::{EventFeed, RandomInjector, ScriptedScenario};
use financex::logging::{log, obj, v_num, v_str, Domain, Level};
use financex::models::MarketEvent;
use financex::storage::StateStore;

/// Sink that writes every accepted event straight to SQLite.
struct SqliteSink<'a> {
    store: &'a mut StateStore,
}

impl EventSink for SqliteSink<'_> {
    fn on_event(&mut self, event: &MarketEvent) -> Result<()> {
        self.store.log_event(event)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let start = now_ts();

    let mut store = StateStore::new(&cfg.sqlite_path)?;
    store.init()?;

    let mut engine = IntelligenceEngine::new(&cfg, start);
    let mut scripted = ScriptedScenario::trading_day(start);
    let feed_rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };
    let mut injector = RandomInjector::new(feed_rng, cfg.injection_prob);

    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("decay_rate", v_num(cfg.decay_rate)),
            ("tick_secs", json!(cfg.tick_secs)),
            ("fleet_size", json!(cfg.fleet_size)),
            ("sqlite_path", v_str(&cfg.sqlite_path)),
            ("scripted_events", json!(scripted.remaining())),
        ]),
    );

    loop {
        let now = now_ts();

        let mut due = scripted.poll(now).await?;
        due.extend(injector.poll(now).await?);
        for event in due {
            let mut sink = SqliteSink { store: &mut store };
            if let Err(err) = engine.ingest(event, &mut sink) {
                log(
                    Level::Error,
                    Domain::Events,
                    "ingest_failed",
                    obj(&[("error", v_str(&err.to_string()))]),
                );
            }
        }

        engine.apply_decay(now);
        let snapshot = engine.detect_state(now);

        if let Err(err) = store
            .log_state(&engine.state_record(now))
            .and_then(|_| store.log_prices(&engine.price_records(now)))
        {
            log(
                Level::Error,
                Domain::Persist,
                "persist_failed",
                obj(&[("error", v_str(&err.to_string()))]),
            );
        }

        let supply = engine.supply_metrics();
        log(
            Level::Info,
            Domain::System,
            "snapshot",
            obj(&[
                ("state", v_str(snapshot.state.as_str())),
                ("regime", v_str(snapshot.regime.as_str())),
                ("risk", v_num(snapshot.risk_score)),
                ("active_events", json!(snapshot.active_events.len())),
                ("moving_ratio", v_num(supply.moving_ratio)),
            ]),
        );

        sleep(Duration::from_secs(cfg.sleep_until_next_tick(now).max(1))).await;
    }
}
