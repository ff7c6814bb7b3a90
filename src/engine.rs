use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::analysis;
use crate::anomaly;
use crate::calendar::{self, CalendarError};
use crate::config::{ConfigError, EngineConfig};
use crate::models::*;
use crate::narrative;
use crate::ovulation;
use crate::prediction;
use crate::statistics;
use crate::symptoms;

/// Entry point for the presentation layer: every analysis bound to one configuration.
///
/// The engine holds nothing but its configuration, so a single instance can be shared
/// between threads and every call depends only on the snapshot passed in.
#[derive(Debug, Clone, Default)]
pub struct CycleEngine {
    config: EngineConfig,
}

impl CycleEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            config: EngineConfig::from_json(json)?,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn valid_lengths(&self, cycles: &[Cycle]) -> Vec<i64> {
        statistics::valid_lengths(cycles, &self.config)
    }

    pub fn average_length(&self, cycles: &[Cycle]) -> i64 {
        statistics::average_length(cycles, &self.config)
    }

    pub fn standard_deviation(&self, cycles: &[Cycle]) -> f64 {
        statistics::standard_deviation(cycles, &self.config)
    }

    pub fn is_irregular(&self, cycles: &[Cycle]) -> bool {
        statistics::is_irregular(cycles, &self.config)
    }

    pub fn cycle_stats(&self, cycles: &[Cycle]) -> CycleStats {
        statistics::cycle_stats(cycles, &self.config)
    }

    pub fn next_period_start(&self, last_cycle: &Cycle, average_length: i64) -> NaiveDate {
        prediction::next_period_start(last_cycle, average_length)
    }

    pub fn ovulation_date(&self, next_period_start: NaiveDate) -> NaiveDate {
        prediction::ovulation_date(next_period_start, &self.config)
    }

    pub fn fertile_window(&self, next_period_start: NaiveDate) -> FertileWindow {
        prediction::fertile_window(next_period_start, &self.config)
    }

    pub fn project_forward(
        &self,
        latest: &Cycle,
        average_length: i64,
        cycles_ahead: usize,
    ) -> Vec<Prediction> {
        prediction::project_forward(latest, average_length, cycles_ahead, &self.config)
    }

    pub fn predict(&self, cycles: &[Cycle]) -> Option<Prediction> {
        prediction::predict(cycles, &self.config)
    }

    pub fn anomalies(&self, cycles: &[Cycle]) -> Vec<CycleAnomaly> {
        anomaly::detect_anomalies(cycles, &self.config)
    }

    pub fn temperature_shift(
        &self,
        cycle_start: NaiveDate,
        logs: &[DailyLog],
    ) -> Option<NaiveDate> {
        ovulation::detect_temperature_shift(cycle_start, logs, &self.config)
    }

    pub fn mucus_peak(&self, cycle_start: NaiveDate, logs: &[DailyLog]) -> Option<NaiveDate> {
        ovulation::detect_mucus_peak(cycle_start, logs, &self.config)
    }

    pub fn top_symptoms_for_day(&self, current_day: i64, snapshot: &Snapshot) -> Vec<String> {
        symptoms::top_symptoms_for_day(current_day, &snapshot.cycles, &snapshot.logs, &self.config)
    }

    pub fn correlations(&self, snapshot: &Snapshot, today: NaiveDate) -> Vec<SymptomCorrelation> {
        symptoms::correlations(&snapshot.cycles, &snapshot.logs, today, &self.config)
    }

    pub fn cycle_summary(&self, cycle: &Cycle, logs: &[DailyLog]) -> Option<CycleSummary> {
        narrative::cycle_summary(cycle, logs, &self.config)
    }

    pub fn weekly_digest(&self, logs: &[DailyLog], reference: NaiveDate) -> WeeklyDigest {
        narrative::weekly_digest(logs, reference, &self.config)
    }

    pub fn weekly_digest_today(&self, logs: &[DailyLog]) -> WeeklyDigest {
        self.weekly_digest(logs, today())
    }

    pub fn status(&self, snapshot: &Snapshot, today: NaiveDate) -> Option<CycleStatus> {
        crate::status::cycle_status(snapshot, today, &self.config)
    }

    pub fn status_today(&self, snapshot: &Snapshot) -> Option<CycleStatus> {
        self.status(snapshot, today())
    }

    pub fn overview(&self, snapshot: &Snapshot, today: NaiveDate) -> AnalysisOverview {
        analysis::overview(snapshot, today, &self.config)
    }

    pub fn overview_today(&self, snapshot: &Snapshot) -> AnalysisOverview {
        self.overview(snapshot, today())
    }

    pub fn day_map(&self, snapshot: &Snapshot, today: NaiveDate) -> BTreeMap<NaiveDate, DayFlags> {
        calendar::build_day_map(snapshot, today, &self.config)
    }

    pub fn month(
        &self,
        year: i32,
        month: u32,
        snapshot: &Snapshot,
        today: NaiveDate,
    ) -> Result<MonthData, CalendarError> {
        calendar::month_page(year, month, snapshot, today, &self.config)
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn history() -> Snapshot {
        let mut start = date("2025-06-01");
        let mut cycles = Vec::new();
        let mut logs = Vec::new();
        for len in [27, 29, 33, 28, 30, 34, 35] {
            cycles.push(Cycle::new(start, Some(start + Duration::days(4))));
            logs.push(DailyLog {
                flow_level: FlowLevel::Heavy,
                symptoms: ["Cramps".to_string()].into_iter().collect(),
                moods: ["Tired".to_string()].into_iter().collect(),
                sleep_hours: 6.5,
                ..DailyLog::new(start)
            });
            start += Duration::days(len);
        }
        cycles.push(Cycle::new(start, None));
        Snapshot::new(cycles, logs)
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.narrative.digest_days = 0;
        assert!(matches!(
            CycleEngine::new(config),
            Err(ConfigError::NotPositive("narrative.digest_days"))
        ));
        assert!(CycleEngine::from_json(r#"{"anomaly":{"min_cycles":5}}"#).is_ok());
    }

    #[test]
    fn facade_delegates_with_its_config() {
        let engine =
            CycleEngine::from_json(r#"{"prediction":{"luteal_phase_days":12}}"#).unwrap();
        assert_eq!(engine.ovulation_date(date("2026-01-20")), date("2026-01-08"));
        assert_eq!(
            engine.fertile_window(date("2026-01-20")).fertile_start,
            date("2026-01-03")
        );
    }

    #[test]
    fn full_history_analysis() {
        let engine = CycleEngine::default();
        let snapshot = history();
        // day 3 of the open cycle that started 2026-01-03
        let today = date("2026-01-05");

        assert_eq!(engine.average_length(&snapshot.cycles), 30);
        let kinds: Vec<AnomalyType> = engine
            .anomalies(&snapshot.cycles)
            .iter()
            .map(|a| a.anomaly_type)
            .collect();
        assert_eq!(kinds, vec![AnomalyType::TrendingLonger]);

        let status = engine.status(&snapshot, today).unwrap();
        assert!(status.is_period_ongoing);
        assert_eq!(status.current_cycle_day, 3);
        assert_eq!(status.quick_log_symptoms, vec!["Cramps"]);

        let summary = engine
            .cycle_summary(&snapshot.cycles[0], &snapshot.logs)
            .unwrap();
        assert_eq!(summary.length, 5);

        let correlations = engine.correlations(&snapshot, today);
        assert_eq!(correlations[0].symptom, "Cramps");
        assert_eq!(correlations[0].cycle_day, 1);
        assert!((correlations[0].frequency - 7.0 / 8.0).abs() < 1e-9);

        let page = engine.month(2026, 2, &snapshot, today).unwrap();
        assert_eq!(page.days.len(), 42);

        let overview = engine.overview(&snapshot, today);
        assert_eq!(overview.cycle_history.len(), 7);
        assert_eq!(overview.recent_summaries.len(), 5);
        assert_eq!(overview.anomalies, engine.anomalies(&snapshot.cycles));
    }

    #[test]
    fn oversized_day_counts_never_reach_the_analysis() {
        for json in [
            r#"{"prediction":{"luteal_phase_days":100000000}}"#,
            r#"{"prediction":{"default_cycle_length":100000000}}"#,
            r#"{"prediction":{"fertile_offset_start":-10}}"#,
        ] {
            assert!(
                matches!(CycleEngine::from_json(json), Err(ConfigError::OutOfBounds { .. })),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn concurrent_calls_agree() {
        let engine = CycleEngine::default();
        let snapshot = history();
        let today = date("2026-02-10");
        let expected = engine.status(&snapshot, today);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| engine.status(&snapshot, today)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn repeated_calls_are_identical() {
        let engine = CycleEngine::default();
        let snapshot = history();
        assert_eq!(
            engine.standard_deviation(&snapshot.cycles).to_bits(),
            engine.standard_deviation(&snapshot.cycles).to_bits()
        );
        assert_eq!(engine.predict(&snapshot.cycles), engine.predict(&snapshot.cycles));
        assert_eq!(
            engine.weekly_digest(&snapshot.logs, date("2026-01-15")),
            engine.weekly_digest(&snapshot.logs, date("2026-01-15"))
        );
    }
}
