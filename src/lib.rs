//! On-device cycle intelligence.
//!
//! Pure, stateless analytics over a snapshot of cycle records and daily logs: cycle
//! statistics, period and fertile-window predictions, history anomalies, ovulation
//! signals, symptom/phase patterns and narrative summaries. Nothing here stores or
//! caches data; every result is a function of the inputs passed in.

pub mod analysis;
pub mod anomaly;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod medication;
pub mod models;
pub mod narrative;
pub mod ovulation;
pub mod prediction;
pub mod statistics;
pub mod status;
pub mod symptoms;
mod tally;

pub use calendar::CalendarError;
pub use config::{ConfigError, EngineConfig};
pub use engine::CycleEngine;
pub use medication::is_medication_due;
pub use models::*;
