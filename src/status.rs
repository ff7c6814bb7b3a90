use chrono::NaiveDate;
use tracing::debug;

use crate::anomaly;
use crate::config::EngineConfig;
use crate::models::{CyclePhase, CycleStatus, Snapshot};
use crate::ovulation;
use crate::prediction;
use crate::statistics;
use crate::symptoms;

/// Where `today` sits in the most recent cycle. `None` until a cycle has been logged.
pub fn cycle_status(
    snapshot: &Snapshot,
    today: NaiveDate,
    config: &EngineConfig,
) -> Option<CycleStatus> {
    let cycles = &snapshot.cycles;
    let Some(last) = snapshot.latest_cycle() else {
        debug!("no cycles logged yet");
        return None;
    };

    let average = statistics::average_length(cycles, config);
    let average_period = statistics::average_period_length(cycles, config);
    let next_period_start = prediction::next_period_start(last, average);
    let current_cycle_day = (today - last.start_date).num_days() + 1;

    let ovulation =
        ovulation::estimate_ovulation(last.start_date, &snapshot.logs, next_period_start, config);
    let fertility = prediction::window_around(ovulation.date, config);

    let is_period_active = match last.end_date {
        Some(end) => today <= end,
        None => current_cycle_day <= average_period,
    };
    let days_remaining_in_period = is_period_active.then(|| match last.end_date {
        Some(end) => (end - today).num_days(),
        None => average_period - current_cycle_day,
    });

    Some(CycleStatus {
        current_cycle_day,
        phase: CyclePhase::for_day(current_cycle_day),
        next_period_start,
        days_until_period: (next_period_start - today).num_days(),
        ovulation,
        fertility,
        is_fertile: fertility.contains(today),
        is_period_active,
        is_period_ongoing: last.is_open(),
        is_ended_today: last.end_date == Some(today),
        days_remaining_in_period,
        quick_log_symptoms: symptoms::top_symptoms_for_day(
            current_cycle_day,
            cycles,
            &snapshot.logs,
            config,
        ),
        anomalies: anomaly::detect_anomalies(cycles, config),
        logged_today: snapshot.log_on(today).is_some(),
    })
}
