use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{CalendarDay, DayFlags, MonthData, PeriodType, Snapshot};
use crate::prediction;
use crate::statistics;

const PAGE_DAYS: i64 = 42;

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Flags for every date touched by a log, a confirmed period or a projection.
///
/// A confirmed period day never carries predicted-period, fertile or ovulation flags.
pub fn build_day_map(
    snapshot: &Snapshot,
    today: NaiveDate,
    config: &EngineConfig,
) -> BTreeMap<NaiveDate, DayFlags> {
    let mut days: BTreeMap<NaiveDate, DayFlags> = BTreeMap::new();

    for log in &snapshot.logs {
        let flags = days.entry(log.date).or_default();
        flags.has_log = true;
        flags.flow = log.flow_level;
    }

    for cycle in statistics::well_formed(&snapshot.cycles) {
        // an ongoing period is shown up to today
        let end = cycle
            .end_date
            .unwrap_or_else(|| today.max(cycle.start_date));
        for date in date_range(cycle.start_date, end) {
            days.entry(date).or_default().is_period = true;
        }
    }

    let Some(latest) = snapshot.latest_cycle() else {
        return days;
    };
    let average = statistics::average_length(&snapshot.cycles, config);
    let projections = prediction::project_forward(
        latest,
        average,
        config.prediction.projection_cycles,
        config,
    );
    debug!(
        projections = projections.len(),
        average, "painting predicted cycles"
    );

    for projected in &projections {
        for date in date_range(projected.predicted_start, projected.predicted_end) {
            let flags = days.entry(date).or_default();
            if !flags.is_period {
                flags.is_predicted_period = true;
            }
        }

        let fertility = projected.fertility;
        for date in date_range(fertility.fertile_start, fertility.fertile_end) {
            let flags = days.entry(date).or_default();
            if !flags.is_period {
                flags.is_fertile = true;
                flags.is_ovulation |= date == fertility.ovulation_day;
            }
        }
    }

    days
}

/// A 42-cell, Sunday-first grid covering `year`-`month`.
pub fn month_page(
    year: i32,
    month: u32,
    snapshot: &Snapshot,
    today: NaiveDate,
    config: &EngineConfig,
) -> Result<MonthData, CalendarError> {
    let first_day =
        NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidMonth { year, month })?;
    let offset = i64::from(first_day.weekday().num_days_from_sunday());
    let grid_start = first_day - Duration::days(offset);

    let map = build_day_map(snapshot, today, config);
    let is_period = |date: NaiveDate| map.get(&date).is_some_and(|f| f.is_period);

    let days = (0..PAGE_DAYS)
        .map(|i| {
            let date = grid_start + Duration::days(i);
            let flags = map.get(&date).copied().unwrap_or_default();
            let period_type = if flags.is_period {
                let prev = is_period(date - Duration::days(1));
                let next = is_period(date + Duration::days(1));
                match (prev, next) {
                    (false, false) => PeriodType::Single,
                    (false, true) => PeriodType::Start,
                    (true, true) => PeriodType::Middle,
                    (true, false) => PeriodType::End,
                }
            } else {
                PeriodType::None
            };

            CalendarDay {
                date,
                in_month: date.month() == month && date.year() == year,
                flags,
                period_type,
            }
        })
        .collect();

    Ok(MonthData { year, month, days })
}

fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}
