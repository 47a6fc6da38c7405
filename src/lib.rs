//! Event-driven market intelligence engine.
//!
//! News-like events carry an impact weight that decays exponentially with
//! age; the aggregate weight drives a sticky state machine, which in turn
//! parameterizes a stochastic price simulator and a tanker fleet simulator.

pub mod batch;
pub mod config;
pub mod decay;
pub mod engine;
pub mod feed;
pub mod fleet;
pub mod indicators;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod regime;
pub mod simulator;
pub mod storage;
