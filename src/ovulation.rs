//! Ovulation signals read directly from daily logs, independent of the calendar
//! prediction: the basal temperature "3 over 6" shift and the cervical mucus peak.

use chrono::{Duration, NaiveDate};
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::models::{DailyLog, OvulationEstimate, OvulationSource};
use crate::prediction;

/// Find the first sustained temperature rise in the cycle starting at `cycle_start`.
///
/// A shift is detected at reading `i` when every one of the next `post` readings is
/// strictly above all of the previous `pre` readings; the date of reading `i - 1`, the
/// last low reading, is returned.
pub fn detect_temperature_shift(
    cycle_start: NaiveDate,
    logs: &[DailyLog],
    config: &EngineConfig,
) -> Option<NaiveDate> {
    let pre = config.signals.pre_shift_window;
    let post = config.signals.post_shift_window;

    let mut points: Vec<(NaiveDate, f64)> = logs
        .iter()
        .filter(|l| l.date >= cycle_start)
        .filter_map(|l| {
            l.temperature
                .filter(|t| t.is_finite())
                .map(|t| (l.date, t))
        })
        .collect();
    points.sort_by_key(|(date, _)| *date);

    let needed = config.signals.min_temperature_points.max(pre + post);
    if pre == 0 || post == 0 || points.len() < needed {
        debug!(
            readings = points.len(),
            needed, "not enough temperature readings for a shift"
        );
        return None;
    }

    for i in pre..=points.len() - post {
        let max_pre = points[i - pre..i]
            .iter()
            .map(|(_, t)| *t)
            .fold(f64::NEG_INFINITY, f64::max);
        let min_post = points[i..i + post]
            .iter()
            .map(|(_, t)| *t)
            .fold(f64::INFINITY, f64::min);

        if min_post > max_pre {
            return Some(points[i - 1].0);
        }
    }
    None
}

/// Last day with fertile-quality mucus in the cycle starting at `cycle_start`.
///
/// Readings are scanned as consecutive pairs, so the final reading of the cycle is only
/// ever seen as the follow-up day and never becomes the peak itself. The dry-up that
/// would confirm a peak is traced but does not change the result.
pub fn detect_mucus_peak(
    cycle_start: NaiveDate,
    logs: &[DailyLog],
    config: &EngineConfig,
) -> Option<NaiveDate> {
    let threshold = config.signals.mucus_peak_threshold;
    let mut cycle_logs: Vec<&DailyLog> = logs.iter().filter(|l| l.date >= cycle_start).collect();
    cycle_logs.sort_by_key(|l| l.date);

    let mut peak = None;
    for pair in cycle_logs.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        if current.cervical_mucus >= threshold {
            peak = Some(current.date);
        }

        if let Some(candidate) = peak {
            if next.cervical_mucus < threshold && next.date == current.date + Duration::days(1) {
                trace!(%candidate, dried_up = %next.date, "fertile mucus dried up");
            }
        }
    }
    peak
}

/// Best available ovulation day: temperature shift, then mucus peak, then the
/// calendar estimate a luteal phase before `next_period_start`.
pub fn estimate_ovulation(
    cycle_start: NaiveDate,
    logs: &[DailyLog],
    next_period_start: NaiveDate,
    config: &EngineConfig,
) -> OvulationEstimate {
    if let Some(date) = detect_temperature_shift(cycle_start, logs, config) {
        return OvulationEstimate {
            date,
            source: OvulationSource::Temperature,
        };
    }
    if let Some(date) = detect_mucus_peak(cycle_start, logs, config) {
        return OvulationEstimate {
            date,
            source: OvulationSource::Mucus,
        };
    }
    OvulationEstimate {
        date: prediction::ovulation_date(next_period_start, config),
        source: OvulationSource::Calendar,
    }
}
