//! Event ledger: ingested events and their decaying weights.
//!
//! Insertion order is preserved; nothing is sorted in place. Events fall
//! out of the ledger once their weight decays to the prune floor, and an
//! identical event ingested later is simply new.

use crate::batch;
use crate::models::{MarketEvent, ProcessedEvent};

/// Events at or below this weight are removed on the next decay pass.
pub const PRUNE_FLOOR: f64 = 0.5;

#[derive(Debug, Default)]
pub struct EventLedger {
    events: Vec<ProcessedEvent>,
    decay_rate: f64,
}

impl EventLedger {
    pub fn new(decay_rate: f64) -> Self {
        Self { events: Vec::new(), decay_rate }
    }

    /// Wrap and append. `base_impact` is accepted as-is: no clamping, no
    /// dedup; the ingestion layer owns validation.
    pub fn ingest(&mut self, event: MarketEvent) {
        let relevance = event.base_impact;
        self.events.push(ProcessedEvent {
            event,
            current_weight: relevance,
            relevance_score: relevance,
        });
    }

    /// Decay every weight against `now` and drop events at or below the
    /// prune floor. Short-circuits on an empty ledger.
    pub fn apply_decay(&mut self, now: u64) {
        if self.events.is_empty() {
            return;
        }
        let weights: Vec<f64> = self.events.iter().map(|e| e.relevance_score).collect();
        let timestamps: Vec<u64> = self.events.iter().map(|e| e.event.ts).collect();
        let decayed = batch::decay_batch(&weights, &timestamps, now, self.decay_rate);

        for (event, w) in self.events.iter_mut().zip(decayed.iter()) {
            event.current_weight = *w;
        }
        self.events.retain(|e| e.current_weight > PRUNE_FLOOR);
    }

    /// Sum of current weights. Meaningful for the `now` last passed to
    /// [`apply_decay`].
    pub fn total_risk(&self) -> f64 {
        self.events.iter().map(|e| e.current_weight).sum()
    }

    /// The `k` heaviest events, descending. Stable: ties keep insertion
    /// order so snapshots are reproducible.
    pub fn top_k(&self, k: usize) -> Vec<ProcessedEvent> {
        let mut ranked: Vec<&ProcessedEvent> = self.events.iter().collect();
        ranked.sort_by(|a, b| {
            b.current_weight
                .partial_cmp(&a.current_weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.into_iter().take(k).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[ProcessedEvent] {
        &self.events
    }
}
