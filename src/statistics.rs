use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::models::{Cycle, CycleStats};

/// Gaps between consecutive cycle starts, most recent pair first, keeping only
/// gaps inside the configured valid band.
pub fn valid_lengths(cycles: &[Cycle], config: &EngineConfig) -> Vec<i64> {
    if cycles.len() < 2 {
        return Vec::new();
    }

    let band = config.prediction.min_cycle_length..=config.prediction.max_cycle_length;
    let mut sorted = well_formed(cycles);
    sorted.sort_by(|a, b| b.start_date.cmp(&a.start_date));

    sorted
        .windows(2)
        .map(|w| (w[0].start_date - w[1].start_date).num_days())
        .filter(|len| band.contains(len))
        .collect()
}

/// Truncated mean of the valid lengths, or the default cycle length without history.
pub fn average_length(cycles: &[Cycle], config: &EngineConfig) -> i64 {
    let lengths = valid_lengths(cycles, config);
    if lengths.is_empty() {
        debug!(
            cycles = cycles.len(),
            "no valid cycle lengths, using default cycle length"
        );
        return config.prediction.default_cycle_length;
    }
    lengths.iter().sum::<i64>() / lengths.len() as i64
}

/// Sample standard deviation of the valid lengths; 0.0 with fewer than two.
pub fn standard_deviation(cycles: &[Cycle], config: &EngineConfig) -> f64 {
    let lengths: Vec<f64> = valid_lengths(cycles, config)
        .into_iter()
        .map(|l| l as f64)
        .collect();
    std_deviation(&lengths)
}

pub fn is_irregular(cycles: &[Cycle], config: &EngineConfig) -> bool {
    standard_deviation(cycles, config) > config.prediction.irregular_std_dev
}

/// Truncated mean bleed duration of closed cycles, ignoring implausible durations.
pub fn average_period_length(cycles: &[Cycle], config: &EngineConfig) -> i64 {
    let band = config.prediction.min_period_length..=config.prediction.max_period_length;
    let lengths: Vec<i64> = well_formed(cycles)
        .into_iter()
        .filter_map(|c| c.end_date.map(|end| (end - c.start_date).num_days() + 1))
        .filter(|len| band.contains(len))
        .collect();

    if lengths.is_empty() {
        return config.prediction.default_period_length;
    }
    lengths.iter().sum::<i64>() / lengths.len() as i64
}

/// Length band, spread and latest period dates of the recorded history.
pub fn cycle_stats(cycles: &[Cycle], config: &EngineConfig) -> CycleStats {
    let lengths = valid_lengths(cycles, config);
    let std_deviation = standard_deviation(cycles, config);
    let last = well_formed(cycles).into_iter().max_by_key(|c| c.start_date);

    CycleStats {
        total_cycles: cycles.len(),
        avg_cycle_length: if lengths.is_empty() {
            None
        } else {
            Some(average_length(cycles, config))
        },
        avg_period_length: average_period_length(cycles, config),
        shortest_cycle: lengths.iter().copied().min(),
        longest_cycle: lengths.iter().copied().max(),
        std_deviation,
        irregular: std_deviation > config.prediction.irregular_std_dev,
        last_period_start: last.map(|c| c.start_date),
        last_period_end: last.and_then(|c| c.end_date),
    }
}

/// Cycles whose end is not before their start. Malformed records are logged and dropped.
pub(crate) fn well_formed(cycles: &[Cycle]) -> Vec<&Cycle> {
    cycles
        .iter()
        .filter(|c| {
            let ok = c.is_well_formed();
            if !ok {
                warn!(
                    cycle_id = %c.id,
                    start = %c.start_date,
                    "skipping cycle that ends before it starts"
                );
            }
            ok
        })
        .collect()
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn starts(dates: &[&str]) -> Vec<Cycle> {
        dates.iter().map(|d| Cycle::new(date(d), None)).collect()
    }

    /// Cycles whose consecutive start gaps are exactly `lengths`.
    fn from_lengths(first: &str, lengths: &[i64]) -> Vec<Cycle> {
        let mut start = date(first);
        let mut cycles = vec![Cycle::new(start, None)];
        for len in lengths {
            start += chrono::Duration::days(*len);
            cycles.push(Cycle::new(start, None));
        }
        cycles
    }

    #[test]
    fn defaults_with_fewer_than_two_cycles() {
        let config = EngineConfig::default();
        assert_eq!(average_length(&[], &config), 28);
        assert_eq!(standard_deviation(&[], &config), 0.0);

        let one = starts(&["2023-01-01"]);
        assert_eq!(average_length(&one, &config), 28);
        assert_eq!(standard_deviation(&one, &config), 0.0);
        assert!(valid_lengths(&one, &config).is_empty());
    }

    #[test]
    fn truncated_average() {
        let config = EngineConfig::default();
        let cycles = starts(&["2023-03-01", "2023-02-01", "2023-01-01"]);
        assert_eq!(valid_lengths(&cycles, &config), vec![28, 31]);
        assert_eq!(average_length(&cycles, &config), 29);
    }

    #[test]
    fn input_order_does_not_matter() {
        let config = EngineConfig::default();
        let cycles = starts(&["2023-01-01", "2023-03-01", "2023-02-01"]);
        assert_eq!(valid_lengths(&cycles, &config), vec![28, 31]);
    }

    #[test]
    fn sample_standard_deviation() {
        let config = EngineConfig::default();
        let cycles = starts(&["2023-01-01", "2023-02-01", "2023-03-01", "2023-04-01"]);
        assert_eq!(valid_lengths(&cycles, &config), vec![31, 28, 31]);
        let sd = standard_deviation(&cycles, &config);
        assert!((sd - 3f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn irregularity_threshold() {
        let config = EngineConfig::default();
        let wild = from_lengths("2024-01-01", &[21, 35, 21, 35]);
        let sd = standard_deviation(&wild, &config);
        assert!((sd - 8.083).abs() < 0.01);
        assert!(is_irregular(&wild, &config));

        let steady = from_lengths("2024-01-01", &[28, 29, 28]);
        assert!(!is_irregular(&steady, &config));
    }

    #[test]
    fn out_of_band_gaps_rejected() {
        let config = EngineConfig::default();
        // 3-day duplicate entry and a 60-day gap from a missed log
        let cycles = from_lengths("2024-01-01", &[28, 3, 60, 30]);
        assert_eq!(valid_lengths(&cycles, &config), vec![30, 28]);
        assert_eq!(average_length(&cycles, &config), 29);
    }

    #[test]
    fn band_edges_inclusive() {
        let config = EngineConfig::default();
        let cycles = from_lengths("2024-01-01", &[15, 50, 14, 51]);
        assert_eq!(valid_lengths(&cycles, &config), vec![50, 15]);
    }

    #[test]
    fn malformed_cycle_skipped() {
        let config = EngineConfig::default();
        let mut cycles = starts(&["2023-01-01", "2023-01-29"]);
        cycles.push(Cycle::new(date("2023-01-15"), Some(date("2023-01-10"))));
        assert_eq!(valid_lengths(&cycles, &config), vec![28]);
    }

    #[test]
    fn period_length_average() {
        let config = EngineConfig::default();
        let cycles = vec![
            Cycle::new(date("2026-01-01"), Some(date("2026-01-05"))),
            Cycle::new(date("2026-01-29"), Some(date("2026-02-02"))),
            Cycle::new(date("2026-02-26"), Some(date("2026-02-28"))),
            // 20-day bleed is discarded as implausible
            Cycle::new(date("2026-03-26"), Some(date("2026-04-14"))),
            Cycle::new(date("2026-04-23"), None),
        ];
        assert_eq!(average_period_length(&cycles, &config), 4);
        assert_eq!(average_period_length(&[], &config), 5);
    }

    #[test]
    fn cycle_stats_computed() {
        let config = EngineConfig::default();
        let cycles = vec![
            Cycle::new(date("2026-01-01"), Some(date("2026-01-05"))),
            Cycle::new(date("2026-01-29"), Some(date("2026-02-02"))),
        ];
        let stats = cycle_stats(&cycles, &config);
        assert_eq!(stats.total_cycles, 2);
        assert_eq!(stats.avg_cycle_length, Some(28));
        assert_eq!(stats.avg_period_length, 5);
        assert_eq!(stats.shortest_cycle, Some(28));
        assert_eq!(stats.longest_cycle, Some(28));
        assert!(!stats.irregular);
        assert_eq!(stats.last_period_start, Some(date("2026-01-29")));
        assert_eq!(stats.last_period_end, Some(date("2026-02-02")));
    }

    #[test]
    fn cycle_stats_without_history() {
        let stats = cycle_stats(&[], &EngineConfig::default());
        assert_eq!(stats.total_cycles, 0);
        assert_eq!(stats.avg_cycle_length, None);
        assert_eq!(stats.last_period_start, None);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let config = EngineConfig::default();
        let cycles = from_lengths("2024-01-01", &[27, 31, 29, 33]);
        assert_eq!(
            standard_deviation(&cycles, &config).to_bits(),
            standard_deviation(&cycles, &config).to_bits()
        );
        assert_eq!(
            average_length(&cycles, &config),
            average_length(&cycles, &config)
        );
    }
}
