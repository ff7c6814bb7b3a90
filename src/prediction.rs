use chrono::{Duration, NaiveDate};

use crate::config::EngineConfig;
use crate::models::{Cycle, FertileWindow, Prediction};
use crate::statistics;

/// Start of the period following `last_cycle`.
pub fn next_period_start(last_cycle: &Cycle, average_length: i64) -> NaiveDate {
    last_cycle.start_date + Duration::days(average_length)
}

/// Ovulation is assumed a fixed luteal phase before the next period.
pub fn ovulation_date(next_period_start: NaiveDate, config: &EngineConfig) -> NaiveDate {
    next_period_start - Duration::days(config.prediction.luteal_phase_days)
}

/// Fertile days around the ovulation implied by `next_period_start`.
pub fn fertile_window(next_period_start: NaiveDate, config: &EngineConfig) -> FertileWindow {
    window_around(ovulation_date(next_period_start, config), config)
}

/// Fertile window for an already known ovulation day.
pub fn window_around(ovulation_day: NaiveDate, config: &EngineConfig) -> FertileWindow {
    FertileWindow {
        fertile_start: ovulation_day - Duration::days(config.prediction.fertile_offset_start),
        fertile_end: ovulation_day + Duration::days(config.prediction.fertile_offset_end),
        ovulation_day,
    }
}

/// Chain `cycles_ahead` future cycles after `latest`, each exactly `average_length`
/// days after the previous one.
pub fn project_forward(
    latest: &Cycle,
    average_length: i64,
    cycles_ahead: usize,
    config: &EngineConfig,
) -> Vec<Prediction> {
    let period_days = config.prediction.predicted_period_days.max(1);
    let mut projections = Vec::with_capacity(cycles_ahead);
    let mut predicted_start = next_period_start(latest, average_length);

    for _ in 0..cycles_ahead {
        projections.push(Prediction {
            predicted_start,
            predicted_end: predicted_start + Duration::days(period_days - 1),
            fertility: fertile_window(predicted_start, config),
        });
        predicted_start += Duration::days(average_length);
    }
    projections
}

/// Next period prediction from the most recent cycle and the historical average.
pub fn predict(cycles: &[Cycle], config: &EngineConfig) -> Option<Prediction> {
    let latest = statistics::well_formed(cycles)
        .into_iter()
        .max_by_key(|c| c.start_date)?;
    let average = statistics::average_length(cycles, config);
    project_forward(latest, average, 1, config).into_iter().next()
}
