use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{AnomalyType, Cycle, CycleAnomaly};
use crate::statistics::{self, mean};

/// Classify the shape of recent cycle history.
///
/// Checks run irregular -> sudden shift -> trend and every qualifying anomaly is
/// returned. Gap lengths here are raw: unlike the statistics, they are not filtered to
/// the valid band, so a single missed period still shows up as a shift or trend.
pub fn detect_anomalies(cycles: &[Cycle], config: &EngineConfig) -> Vec<CycleAnomaly> {
    let settings = &config.anomaly;
    let mut anomalies = Vec::new();
    let mut sorted = statistics::well_formed(cycles);
    if sorted.len() < settings.min_cycles {
        debug!(cycles = sorted.len(), "not enough cycles for anomaly detection");
        return anomalies;
    }

    sorted.sort_by_key(|c| c.start_date);
    let lengths: Vec<f64> = sorted
        .windows(2)
        .map(|w| (w[1].start_date - w[0].start_date).num_days() as f64)
        .collect();

    if lengths.len() < settings.min_lengths.max(3) {
        return anomalies;
    }

    let sd = statistics::standard_deviation(cycles, config);
    if sd > config.prediction.irregular_std_dev {
        anomalies.push(CycleAnomaly {
            anomaly_type: AnomalyType::Irregular,
            description: format!(
                "Your cycle length varies significantly (approx +/- {} days). Predictions may be less accurate.",
                sd.round() as i64
            ),
            severity: 2,
        });
    }

    if lengths.len() >= settings.min_lengths_for_shift && lengths.len() > settings.recent_window {
        let (history, recent) = lengths.split_at(lengths.len() - settings.recent_window);
        let history_mean = mean(history);
        let recent_mean = mean(recent);

        if (recent_mean - history_mean).abs() >= settings.shift_threshold_days {
            let direction = if recent_mean > history_mean {
                "longer"
            } else {
                "shorter"
            };
            anomalies.push(CycleAnomaly {
                anomaly_type: AnomalyType::SuddenShift,
                description: format!(
                    "Your last {} cycles have been consistently {} ({} days) than your usual average ({} days).",
                    recent.len(),
                    direction,
                    recent_mean.round() as i64,
                    history_mean.round() as i64
                ),
                severity: 3,
            });
        }
    }

    let last3 = &lengths[lengths.len() - 3..];
    if last3[0] < last3[1] && last3[1] < last3[2] {
        anomalies.push(CycleAnomaly {
            anomaly_type: AnomalyType::TrendingLonger,
            description: "Your cycle has been getting longer for the last 3 months.".into(),
            severity: 1,
        });
    } else if last3[0] > last3[1] && last3[1] > last3[2] {
        anomalies.push(CycleAnomaly {
            anomaly_type: AnomalyType::TrendingShorter,
            description: "Your cycle has been getting shorter for the last 3 months.".into(),
            severity: 1,
        });
    }

    anomalies
}
