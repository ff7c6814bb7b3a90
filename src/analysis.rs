use chrono::{Months, NaiveDate};
use tracing::debug;

use crate::anomaly;
use crate::config::EngineConfig;
use crate::models::{AnalysisOverview, CycleLength, DailyLog, Snapshot, TagCount};
use crate::narrative;
use crate::statistics;
use crate::symptoms;
use crate::tally;

/// Cycle history, tag frequencies, recent summaries and pattern findings for the
/// analysis screen.
///
/// Only logs from the last `narrative.history_months` months up to `today` are
/// considered. Cycle history and anomalies use every cycle.
pub fn overview(
    snapshot: &Snapshot,
    today: NaiveDate,
    config: &EngineConfig,
) -> AnalysisOverview {
    let window_start = today
        .checked_sub_months(Months::new(config.narrative.history_months))
        .unwrap_or(NaiveDate::MIN);
    let window: Vec<DailyLog> = snapshot
        .logs_between(window_start, today)
        .into_iter()
        .cloned()
        .collect();
    debug!(logs = window.len(), %window_start, "building analysis overview");

    let mut closed: Vec<_> = statistics::well_formed(&snapshot.cycles)
        .into_iter()
        .filter(|c| c.end_date.is_some())
        .collect();
    closed.sort_by_key(|c| c.start_date);

    let cycle_history = closed
        .iter()
        .filter_map(|c| {
            let end = c.end_date?;
            Some(CycleLength {
                start_date: c.start_date,
                length: (end - c.start_date).num_days() + 1,
            })
        })
        .collect();

    let recent_summaries = closed
        .iter()
        .rev()
        .take(config.narrative.recent_summaries)
        .filter_map(|c| narrative::cycle_summary(c, &window, config))
        .collect();

    AnalysisOverview {
        cycle_history,
        symptom_counts: counts(window.iter().flat_map(|l| l.symptoms.iter())),
        mood_counts: counts(window.iter().flat_map(|l| l.moods.iter())),
        recent_summaries,
        weekly_digest: narrative::weekly_digest(&window, today, config),
        correlations: symptoms::correlations(&snapshot.cycles, &window, today, config),
        anomalies: anomaly::detect_anomalies(&snapshot.cycles, config),
    }
}

fn counts<'a, I>(tags: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = &'a String>,
{
    tally::rank(tags)
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnomalyType, Cycle};
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn log(d: &str, symptoms: &[&str], moods: &[&str]) -> DailyLog {
        DailyLog {
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            moods: moods.iter().map(|s| s.to_string()).collect(),
            ..DailyLog::new(date(d))
        }
    }

    fn tag(tag: &str, count: usize) -> TagCount {
        TagCount {
            tag: tag.to_string(),
            count,
        }
    }

    /// Seven closed cycles 28 days apart from 2026-01-01, then an open one.
    fn snapshot(logs: Vec<DailyLog>) -> Snapshot {
        let mut start = date("2026-01-01");
        let mut cycles = Vec::new();
        for _ in 0..7 {
            cycles.push(Cycle::new(start, Some(start + Duration::days(4))));
            start += Duration::days(28);
        }
        cycles.push(Cycle::new(start, None));
        Snapshot::new(cycles, logs)
    }

    #[test]
    fn history_lists_closed_cycles_oldest_first() {
        let mut snap = snapshot(Vec::new());
        snap.cycles.reverse();
        snap.cycles.push(Cycle::new(date("2026-03-01"), Some(date("2026-02-20"))));
        let result = overview(&snap, date("2026-07-25"), &EngineConfig::default());

        assert_eq!(result.cycle_history.len(), 7);
        assert_eq!(
            result.cycle_history[0],
            CycleLength {
                start_date: date("2026-01-01"),
                length: 5
            }
        );
        assert!(result
            .cycle_history
            .windows(2)
            .all(|w| w[0].start_date < w[1].start_date));
    }

    #[test]
    fn summarises_the_five_most_recent_closed_cycles() {
        let config = EngineConfig::default();
        let result = overview(&snapshot(Vec::new()), date("2026-07-25"), &config);
        let starts: Vec<NaiveDate> = result.recent_summaries.iter().map(|s| s.start_date).collect();
        assert_eq!(
            starts,
            vec![
                date("2026-06-18"),
                date("2026-05-21"),
                date("2026-04-23"),
                date("2026-03-26"),
                date("2026-02-26"),
            ]
        );
    }

    #[test]
    fn counts_tags_inside_the_history_window() {
        let logs = vec![
            log("2026-07-20", &["Cramps", "Acne"], &["Calm"]),
            log("2026-07-21", &["Cramps"], &["Happy"]),
            log("2026-07-22", &["Bloating"], &["Happy"]),
            // more than six months before today
            log("2025-12-01", &["Acne", "Acne2"], &["Sad"]),
        ];
        let result = overview(&snapshot(logs), date("2026-07-25"), &EngineConfig::default());

        assert_eq!(
            result.symptom_counts,
            vec![tag("Cramps", 2), tag("Acne", 1), tag("Bloating", 1)]
        );
        assert_eq!(result.mood_counts[0], tag("Happy", 2));
        assert_eq!(result.mood_counts.len(), 2);
        assert_eq!(result.weekly_digest.dominant_mood.as_deref(), Some("Happy"));
        assert_eq!(result.weekly_digest.dominant_symptom.as_deref(), Some("Cramps"));
    }

    #[test]
    fn includes_correlations_and_anomalies() {
        let mut snap = snapshot(Vec::new());
        let starts: Vec<NaiveDate> = snap.cycles.iter().map(|c| c.start_date).collect();
        snap.logs = starts
            .iter()
            .map(|d| log(&d.format("%Y-%m-%d").to_string(), &["Cramps"], &[]))
            .collect();
        // a late start stretches the last gap to 48 days
        let last = snap.cycles.len() - 1;
        snap.cycles[last].start_date += Duration::days(20);
        snap.logs[last].date += Duration::days(20);

        let result = overview(&snap, date("2026-08-10"), &EngineConfig::default());
        assert_eq!(result.correlations[0].symptom, "Cramps");
        assert_eq!(result.correlations[0].cycle_day, 1);
        assert!(result
            .anomalies
            .iter()
            .any(|a| a.anomaly_type == AnomalyType::SuddenShift));
    }

    #[test]
    fn empty_snapshot() {
        let config = EngineConfig::default();
        let result = overview(&Snapshot::default(), date("2026-07-25"), &config);
        assert!(result.cycle_history.is_empty());
        assert!(result.symptom_counts.is_empty());
        assert!(result.recent_summaries.is_empty());
        assert!(result.correlations.is_empty());
        assert!(result.anomalies.is_empty());
        assert_eq!(result.weekly_digest.narrative, "No logs recorded this week.");
    }
}
