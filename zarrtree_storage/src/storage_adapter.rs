//! Stores that wrap another store.

pub mod performance_metrics;
