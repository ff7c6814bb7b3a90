use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{Cycle, CyclePhase, DailyLog, SymptomCorrelation};
use crate::statistics;
use crate::tally;

/// Symptoms most often logged during the phase that `current_day` falls in, across
/// every historical cycle. Used for quick-entry suggestions.
pub fn top_symptoms_for_day(
    current_day: i64,
    cycles: &[Cycle],
    logs: &[DailyLog],
    config: &EngineConfig,
) -> Vec<String> {
    if cycles.is_empty() || logs.is_empty() {
        return Vec::new();
    }

    let phase_days = CyclePhase::for_day(current_day).days();
    let logs_by_date: HashMap<NaiveDate, &DailyLog> = logs
        .iter()
        .filter(|l| !l.symptoms.is_empty())
        .map(|l| (l.date, l))
        .collect();

    let mut tags: Vec<&String> = Vec::new();
    for cycle in cycles {
        for day in phase_days.clone() {
            let date = cycle.start_date + Duration::days(day - 1);
            // this day never existed in a shorter cycle
            if cycle.end_date.is_some_and(|end| date > end) {
                continue;
            }
            if let Some(log) = logs_by_date.get(&date) {
                tags.extend(log.symptoms.iter());
            }
        }
    }

    tally::top(tags, config.correlation.top_symptoms)
}

/// Symptoms that recur on the same cycle day in at least half of the cycles that
/// reached that day, most frequent first.
///
/// Open cycles are closed at `today` when counting how many cycles reached a day.
pub fn correlations(
    cycles: &[Cycle],
    logs: &[DailyLog],
    today: NaiveDate,
    config: &EngineConfig,
) -> Vec<SymptomCorrelation> {
    if cycles.is_empty() || logs.is_empty() {
        return Vec::new();
    }
    let settings = &config.correlation;

    let mut sorted = statistics::well_formed(cycles);
    sorted.sort_by_key(|c| c.start_date);

    let mut occurrences: BTreeMap<(&str, i64), u32> = BTreeMap::new();
    for log in logs {
        let Some(cycle) = sorted.iter().rev().find(|c| c.start_date <= log.date) else {
            continue;
        };
        let day = (log.date - cycle.start_date).num_days() + 1;
        if day > settings.max_cycle_day {
            continue;
        }
        for symptom in &log.symptoms {
            *occurrences.entry((symptom.as_str(), day)).or_insert(0) += 1;
        }
    }

    let lengths: Vec<i64> = sorted.iter().map(|c| c.duration_days(today)).collect();
    let max_day = lengths
        .iter()
        .copied()
        .max()
        .unwrap_or(28)
        .min(settings.max_cycle_day)
        .max(0);
    // reached[d] = how many cycles lasted at least d days
    let reached: Vec<u32> = (0..=max_day)
        .map(|d| lengths.iter().filter(|&&len| len >= d).count() as u32)
        .collect();

    let mut results: Vec<SymptomCorrelation> = occurrences
        .into_iter()
        .filter_map(|((symptom, day), count)| {
            let denominator = usize::try_from(day)
                .ok()
                .and_then(|d| reached.get(d))
                .copied()
                .unwrap_or(0);
            if denominator < settings.min_cycles_per_day {
                return None;
            }
            let frequency = f64::from(count) / f64::from(denominator);
            (frequency >= settings.min_frequency).then(|| SymptomCorrelation {
                symptom: symptom.to_owned(),
                cycle_day: day as u32,
                frequency,
                occurrences: count,
            })
        })
        .collect();

    // stable: equal frequencies stay ordered by symptom, then day
    results.sort_by(|a, b| b.frequency.total_cmp(&a.frequency));
    debug!(found = results.len(), "symptom correlations computed");
    results
}
