//! SQLite persistence for events, prices and state transitions.

use anyhow::Result;
use rusqlite::{params, Connection};

use crate::models::{MarketEvent, MarketSnapshot, PriceRecord, StateRecord};

pub struct StateStore {
    conn: Connection,
}

impl StateStore {
    pub fn new(path: &str) -> Result<Self> {
        Ok(Self { conn: Connection::open(path)? })
    }

    pub fn init(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS market_events (
                ts INTEGER NOT NULL,
                event_type TEXT NOT NULL,
                description TEXT NOT NULL,
                base_impact REAL NOT NULL,
                asset_class TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS ticker_history (
                ts INTEGER NOT NULL,
                symbol TEXT NOT NULL,
                price REAL NOT NULL,
                change_pct REAL NOT NULL,
                volume INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS system_state (
                ts INTEGER NOT NULL,
                state TEXT NOT NULL,
                risk_score REAL NOT NULL,
                regime TEXT NOT NULL
            );
            COMMIT;",
        )?;
        Ok(())
    }

    pub fn log_event(&mut self, event: &MarketEvent) -> Result<()> {
        self.conn.execute(
            "INSERT INTO market_events (ts, event_type, description, base_impact, asset_class)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.ts as i64,
                event.event_type,
                event.description,
                event.base_impact,
                event.asset_class
            ],
        )?;
        Ok(())
    }

    pub fn log_prices(&mut self, records: &[PriceRecord]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for r in records {
            tx.execute(
                "INSERT INTO ticker_history (ts, symbol, price, change_pct, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![r.ts as i64, r.symbol, r.price, r.change_pct, r.volume as i64],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn log_state(&mut self, record: &StateRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO system_state (ts, state, risk_score, regime) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.ts as i64,
                record.state.as_str(),
                record.risk_score,
                record.regime.as_str()
            ],
        )?;
        Ok(())
    }

    pub fn log_snapshot(&mut self, snapshot: &MarketSnapshot) -> Result<()> {
        self.log_state(&StateRecord {
            ts: snapshot.ts,
            state: snapshot.state,
            risk_score: snapshot.risk_score,
            regime: snapshot.regime,
        })
    }

    pub fn recent_states(&mut self, limit: usize) -> Result<Vec<(u64, String, f64, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT ts, state, risk_score, regime FROM system_state ORDER BY ts DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)? as u64,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn event_count(&mut self) -> Result<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM market_events", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
