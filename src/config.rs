use serde::{Deserialize, Serialize};

use crate::models::{CervicalMucus, FlowLevel};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid range for {field}: {min} > {max}")]
    InvertedRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfBounds {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
}

/// Upper bound for any configured day count, keeping date arithmetic in range.
pub const MAX_DAYS: i64 = 366;
pub const MAX_PROJECTION_CYCLES: usize = 24;
pub const MAX_HISTORY_MONTHS: u32 = 120;

/// Tunable constants for every analysis. Missing JSON fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub prediction: PredictionConfig,
    pub anomaly: AnomalyConfig,
    pub signals: SignalConfig,
    pub correlation: CorrelationConfig,
    pub narrative: NarrativeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub default_cycle_length: i64,
    /// Gaps between consecutive starts outside this band are treated as data-entry errors.
    pub min_cycle_length: i64,
    pub max_cycle_length: i64,
    pub irregular_std_dev: f64,
    pub luteal_phase_days: i64,
    /// Days before ovulation the fertile window opens.
    pub fertile_offset_start: i64,
    /// Days after ovulation the fertile window closes.
    pub fertile_offset_end: i64,
    pub default_period_length: i64,
    pub min_period_length: i64,
    pub max_period_length: i64,
    pub projection_cycles: usize,
    pub predicted_period_days: i64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            default_cycle_length: 28,
            min_cycle_length: 15,
            max_cycle_length: 50,
            irregular_std_dev: 5.0,
            luteal_phase_days: 14,
            fertile_offset_start: 5,
            fertile_offset_end: 1,
            default_period_length: 5,
            min_period_length: 2,
            max_period_length: 10,
            projection_cycles: 3,
            predicted_period_days: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub min_cycles: usize,
    pub min_lengths: usize,
    pub min_lengths_for_shift: usize,
    /// Number of most recent lengths compared against the rest of history.
    pub recent_window: usize,
    pub shift_threshold_days: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_cycles: 4,
            min_lengths: 3,
            min_lengths_for_shift: 6,
            recent_window: 3,
            shift_threshold_days: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub min_temperature_points: usize,
    pub pre_shift_window: usize,
    pub post_shift_window: usize,
    pub mucus_peak_threshold: CervicalMucus,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_temperature_points: 10,
            pre_shift_window: 6,
            post_shift_window: 3,
            mucus_peak_threshold: CervicalMucus::Watery,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    pub max_cycle_day: i64,
    pub min_cycles_per_day: u32,
    pub min_frequency: f64,
    pub top_symptoms: usize,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            max_cycle_day: 50,
            min_cycles_per_day: 3,
            min_frequency: 0.5,
            top_symptoms: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub short_cycle_days: i64,
    pub long_cycle_days: i64,
    pub heavy_flow: FlowLevel,
    /// A heavy-flow insight is added once the count exceeds this.
    pub heavy_days_insight: usize,
    pub digest_days: i64,
    /// How far back the analysis overview looks for logs.
    pub history_months: u32,
    /// Number of most recent closed cycles summarised in the overview.
    pub recent_summaries: usize,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            short_cycle_days: 21,
            long_cycle_days: 35,
            heavy_flow: FlowLevel::Medium,
            heavy_days_insight: 2,
            digest_days: 7,
            history_months: 6,
            recent_summaries: 5,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON document over the defaults and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.prediction;
        check_offset("prediction.min_cycle_length", p.min_cycle_length)?;
        check_offset("prediction.max_cycle_length", p.max_cycle_length)?;
        check_range("prediction.cycle_length", p.min_cycle_length, p.max_cycle_length)?;
        check_offset("prediction.min_period_length", p.min_period_length)?;
        check_offset("prediction.max_period_length", p.max_period_length)?;
        check_range("prediction.period_length", p.min_period_length, p.max_period_length)?;
        check_days("prediction.default_cycle_length", p.default_cycle_length)?;
        check_days("prediction.default_period_length", p.default_period_length)?;
        check_positive("prediction.irregular_std_dev", p.irregular_std_dev > 0.0)?;
        check_days("prediction.luteal_phase_days", p.luteal_phase_days)?;
        check_offset("prediction.fertile_offset_start", p.fertile_offset_start)?;
        check_offset("prediction.fertile_offset_end", p.fertile_offset_end)?;
        check_days("prediction.predicted_period_days", p.predicted_period_days)?;
        check_bounds(
            "prediction.projection_cycles",
            p.projection_cycles as i64,
            0,
            MAX_PROJECTION_CYCLES as i64,
        )?;

        let a = &self.anomaly;
        check_positive("anomaly.recent_window", a.recent_window > 0)?;
        check_positive("anomaly.shift_threshold_days", a.shift_threshold_days > 0.0)?;
        if a.min_lengths_for_shift <= a.recent_window {
            return Err(ConfigError::InvertedRange {
                field: "anomaly.min_lengths_for_shift",
                min: a.recent_window as i64 + 1,
                max: a.min_lengths_for_shift as i64,
            });
        }

        let s = &self.signals;
        check_positive("signals.pre_shift_window", s.pre_shift_window > 0)?;
        check_positive("signals.post_shift_window", s.post_shift_window > 0)?;

        let c = &self.correlation;
        check_days("correlation.max_cycle_day", c.max_cycle_day)?;
        check_positive("correlation.min_cycles_per_day", c.min_cycles_per_day > 0)?;
        check_positive("correlation.min_frequency", c.min_frequency > 0.0)?;

        let n = &self.narrative;
        check_range("narrative.cycle_days", n.short_cycle_days, n.long_cycle_days)?;
        check_days("narrative.digest_days", n.digest_days)?;
        check_bounds(
            "narrative.history_months",
            i64::from(n.history_months),
            1,
            i64::from(MAX_HISTORY_MONTHS),
        )?;
        Ok(())
    }
}

fn check_range(field: &'static str, min: i64, max: i64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange { field, min, max });
    }
    Ok(())
}

/// A day count that must be at least one day.
fn check_days(field: &'static str, value: i64) -> Result<(), ConfigError> {
    check_positive(field, value > 0)?;
    check_bounds(field, value, 1, MAX_DAYS)
}

/// A day offset or band edge, where zero is allowed.
fn check_offset(field: &'static str, value: i64) -> Result<(), ConfigError> {
    check_bounds(field, value, 0, MAX_DAYS)
}

fn check_bounds(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfBounds {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

fn check_positive(field: &'static str, ok: bool) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::NotPositive(field))
    }
}
